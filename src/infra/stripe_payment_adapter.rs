use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{
        CheckoutRequest, CustomerId, PaymentProviderPort, ProviderSubscription, RedirectSession,
        SubscriptionId, WebhookEvent, WebhookPayload,
    },
    domain::entities::user::UserId,
    infra::stripe_client::{
        CheckoutSessionParams, StripeClient, StripeSubscription, StripeWebhookEvent,
    },
};

/// Adapter that wraps StripeClient to implement PaymentProviderPort.
#[derive(Clone)]
pub struct StripePaymentAdapter {
    client: StripeClient,
    webhook_secret: Option<SecretString>,
}

impl StripePaymentAdapter {
    pub fn new(
        secret_key: SecretString,
        webhook_secret: Option<SecretString>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: StripeClient::new(secret_key)?,
            webhook_secret,
        })
    }
}

/// Reduce a verified Stripe event to the payload the reconciler acts on.
pub fn webhook_event_from_stripe(event: StripeWebhookEvent) -> WebhookEvent {
    let payload = match event.event_type.as_str() {
        "checkout.session.completed" => WebhookPayload::CheckoutCompleted {
            user_id: event.metadata_user_id().map(UserId::new),
            subscription_id: event.subscription_id().map(SubscriptionId::new),
        },
        "invoice.payment_succeeded" => WebhookPayload::InvoicePaymentSucceeded {
            subscription_id: event.subscription_id().map(SubscriptionId::new),
        },
        _ => WebhookPayload::Other,
    };

    WebhookEvent {
        id: event.id,
        event_type: event.event_type,
        payload,
    }
}

fn timestamp_to_datetime(ts: i64) -> AppResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .ok_or_else(|| AppError::Provider(format!("Invalid period end timestamp: {ts}")))
}

#[async_trait]
impl PaymentProviderPort for StripePaymentAdapter {
    async fn create_checkout(&self, request: &CheckoutRequest) -> AppResult<RedirectSession> {
        let session = self
            .client
            .create_checkout_session(&CheckoutSessionParams {
                price: &request.price,
                customer_email: request.customer_email.as_deref(),
                user_id: request.user_id.as_str(),
                success_url: &request.success_url,
                cancel_url: &request.cancel_url,
            })
            .await?;

        let url = session
            .url
            .ok_or_else(|| AppError::Provider("Checkout session has no URL".into()))?;
        Ok(RedirectSession { url })
    }

    async fn create_portal_session(
        &self,
        customer: &CustomerId,
        return_url: &str,
    ) -> AppResult<RedirectSession> {
        let session = self
            .client
            .create_portal_session(customer.as_str(), return_url)
            .await?;
        Ok(RedirectSession { url: session.url })
    }

    async fn get_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> AppResult<Option<ProviderSubscription>> {
        let sub = match self.client.get_subscription(subscription_id.as_str()).await {
            Ok(sub) => sub,
            Err(AppError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };

        provider_subscription(sub).map(Some)
    }

    fn verify_webhook(&self, payload: &str, signature_header: &str) -> AppResult<WebhookEvent> {
        let secret = self
            .webhook_secret
            .as_ref()
            .ok_or(AppError::ProviderNotConfigured("payment webhook"))?;

        let event = StripeClient::construct_event(payload, signature_header, secret.expose_secret())?;
        Ok(webhook_event_from_stripe(event))
    }
}

fn provider_subscription(sub: StripeSubscription) -> AppResult<ProviderSubscription> {
    let Some(price_id) = sub.price_id().map(str::to_string) else {
        tracing::warn!(subscription_id = %sub.id, "Stripe subscription has no price");
        return Err(AppError::Provider(format!(
            "Subscription {} has no price",
            sub.id
        )));
    };
    let period_end = sub
        .period_end()
        .ok_or_else(|| AppError::Provider("Subscription has no period end".into()))?;

    Ok(ProviderSubscription {
        price_id,
        current_period_end: timestamp_to_datetime(period_end)?,
        subscription_id: SubscriptionId::new(sub.id),
        customer_id: CustomerId::new(sub.customer),
    })
}
