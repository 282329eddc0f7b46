use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::{ai_provider::AiProvider, payment_provider::PaymentProviderPort},
        use_cases::{
            billing::BillingUseCases,
            billing_webhook::BillingWebhookUseCases,
            entitlement::EntitlementUseCases,
            generation::GenerationUseCases,
            subscription::{SubscriptionPolicy, SubscriptionRepo, SubscriptionUseCases},
            usage::UsageRepo,
        },
    },
    infra::{
        ai_gateway::AiGateway,
        config::AppConfig,
        error::InfraError,
        gemini_client::GeminiClient,
        postgres_persistence,
        replicate_client::ReplicateClient,
        stripe_payment_adapter::StripePaymentAdapter,
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;

    let postgres_arc =
        Arc::new(postgres_persistence(&config.database_url, config.db_max_connections).await?);

    let usage_repo_arc = postgres_arc.clone() as Arc<dyn UsageRepo>;
    let subscription_repo_arc = postgres_arc.clone() as Arc<dyn SubscriptionRepo>;

    let payment_provider = match &config.stripe {
        Some(stripe) => {
            if stripe.webhook_secret.is_none() {
                tracing::warn!("STRIPE_WEBHOOK_SECRET not set, billing webhooks will be rejected");
            }
            let adapter = StripePaymentAdapter::new(
                stripe.secret_key.clone(),
                stripe.webhook_secret.clone(),
            )
            .map_err(InfraError::from)?;
            Some(Arc::new(adapter) as Arc<dyn PaymentProviderPort>)
        }
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set, billing is disabled");
            None
        }
    };

    let text_client = match &config.gemini {
        Some(gemini) => Some(
            GeminiClient::new(
                gemini.api_url.clone(),
                gemini.api_key.clone(),
                gemini.model.clone(),
            )
            .map_err(InfraError::from)?,
        ),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, conversation and code tools are disabled");
            None
        }
    };

    let media_client = match &config.replicate {
        Some(replicate) => Some(
            ReplicateClient::new(replicate.api_token.clone(), replicate.models.clone())
                .map_err(InfraError::from)?,
        ),
        None => {
            tracing::warn!("REPLICATE_API_TOKEN not set, image, video and music tools are disabled");
            None
        }
    };

    let ai_provider: Arc<dyn AiProvider> = Arc::new(AiGateway::new(text_client, media_client));

    let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
        subscription_repo_arc.clone(),
        SubscriptionPolicy {
            grace: config.subscription_grace,
            paid_price_id: config.pro_plan.price_id.clone(),
        },
    ));

    let entitlement_use_cases = Arc::new(EntitlementUseCases::new(
        usage_repo_arc,
        subscription_use_cases,
        config.free_limit,
    ));

    let generation_use_cases = GenerationUseCases::new(ai_provider, entitlement_use_cases.clone());

    let billing_use_cases = BillingUseCases::new(
        subscription_repo_arc.clone(),
        payment_provider.clone(),
        config.pro_plan.plan_price(),
        config.settings_url(),
    );

    let billing_webhook_use_cases =
        BillingWebhookUseCases::new(subscription_repo_arc, payment_provider);

    Ok(AppState {
        config: Arc::new(config),
        entitlement_use_cases,
        generation_use_cases: Arc::new(generation_use_cases),
        billing_use_cases: Arc::new(billing_use_cases),
        billing_webhook_use_cases: Arc::new(billing_webhook_use_cases),
    })
}

pub fn init_tracing() -> Result<(), InfraError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sage_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").map_err(InfraError::LogFile)?;
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();

    Ok(())
}
