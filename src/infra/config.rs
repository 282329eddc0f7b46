use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use crate::{
    application::ports::payment_provider::PlanPrice, infra::gemini_client::GEMINI_API_URL,
    infra::replicate_client::ReplicateModels,
};

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Public origin of the dashboard; billing redirects return to `/settings` here.
    pub app_origin: Url,
    pub cors_origin: HeaderValue,
    /// HS256 secret shared with the identity provider that issues session tokens.
    pub identity_jwt_secret: SecretString,
    pub free_limit: i64,
    /// How long past the period end a subscription still counts as active.
    pub subscription_grace: chrono::Duration,
    pub stripe: Option<StripeConfig>,
    pub pro_plan: ProPlanConfig,
    pub gemini: Option<GeminiConfig>,
    pub replicate: Option<ReplicateConfig>,
}

pub struct StripeConfig {
    pub secret_key: SecretString,
    pub webhook_secret: Option<SecretString>,
}

pub struct ProPlanConfig {
    /// Known paid price id. When set, checkout references it and only
    /// records with this price count as subscribed.
    pub price_id: Option<String>,
    pub name: String,
    pub description: String,
    pub amount_cents: i64,
    pub currency: String,
    pub interval: String,
}

impl ProPlanConfig {
    pub fn plan_price(&self) -> PlanPrice {
        match &self.price_id {
            Some(price_id) => PlanPrice::Catalog {
                price_id: price_id.clone(),
            },
            None => PlanPrice::Inline {
                name: self.name.clone(),
                description: self.description.clone(),
                unit_amount_cents: self.amount_cents,
                currency: self.currency.clone(),
                interval: self.interval.clone(),
            },
        }
    }
}

impl Default for ProPlanConfig {
    fn default() -> Self {
        Self {
            price_id: None,
            name: "Sage Pro".to_string(),
            description: "Unlimited access to Sage Pro features".to_string(),
            amount_cents: 1000,
            currency: "usd".to_string(),
            interval: "month".to_string(),
        }
    }
}

pub struct GeminiConfig {
    pub api_key: SecretString,
    pub api_url: String,
    pub model: String,
}

pub struct ReplicateConfig {
    pub api_token: SecretString,
    pub models: ReplicateModels,
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn optional_secret(key: &str) -> Option<SecretString> {
    optional_env(key).map(|v| SecretString::new(v.into()))
}

fn grace_from_hours(hours: i64) -> anyhow::Result<chrono::Duration> {
    anyhow::ensure!(hours >= 0, "SUBSCRIPTION_GRACE_HOURS must not be negative");
    chrono::Duration::try_hours(hours)
        .ok_or_else(|| anyhow::anyhow!("SUBSCRIPTION_GRACE_HOURS is out of range: {hours}"))
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3001)));
        let database_url: String = get_env("DATABASE_URL");
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);
        let app_origin: Url = get_env("APP_ORIGIN");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| anyhow::anyhow!("CORS_ORIGIN must be a valid header value"))?;
        let identity_jwt_secret =
            SecretString::new(get_env::<String>("IDENTITY_JWT_SECRET").into());

        let free_limit: i64 = get_env_default("FREE_LIMIT", 5);
        anyhow::ensure!(free_limit >= 0, "FREE_LIMIT must not be negative");
        let subscription_grace =
            grace_from_hours(get_env_default("SUBSCRIPTION_GRACE_HOURS", 24))?;

        // Billing stays disabled until a secret key is present.
        let stripe = optional_secret("STRIPE_SECRET_KEY").map(|secret_key| StripeConfig {
            secret_key,
            webhook_secret: optional_secret("STRIPE_WEBHOOK_SECRET"),
        });

        let defaults = ProPlanConfig::default();
        let pro_plan = ProPlanConfig {
            price_id: optional_env("STRIPE_PRICE_ID"),
            name: get_env_default("PRO_PLAN_NAME", defaults.name),
            description: get_env_default("PRO_PLAN_DESCRIPTION", defaults.description),
            amount_cents: get_env_default("PRO_PLAN_AMOUNT_CENTS", defaults.amount_cents),
            currency: get_env_default("PRO_PLAN_CURRENCY", defaults.currency),
            interval: get_env_default("PRO_PLAN_INTERVAL", defaults.interval),
        };

        let gemini = optional_secret("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            api_url: get_env_default("GEMINI_API_URL", GEMINI_API_URL.to_string()),
            model: get_env_default("GEMINI_MODEL", "gemini-pro".to_string()),
        });

        let replicate = optional_secret("REPLICATE_API_TOKEN").map(|api_token| ReplicateConfig {
            api_token,
            models: ReplicateModels {
                image: get_env_default("REPLICATE_IMAGE_MODEL", "stability-ai/sdxl".to_string()),
                video: get_env_default(
                    "REPLICATE_VIDEO_MODEL",
                    "anotherjesse/zeroscope-v2-xl".to_string(),
                ),
                music: get_env_default("REPLICATE_MUSIC_MODEL", "meta/musicgen".to_string()),
            },
        });

        Ok(Self {
            bind_addr,
            database_url,
            db_max_connections,
            app_origin,
            cors_origin,
            identity_jwt_secret,
            free_limit,
            subscription_grace,
            stripe,
            pro_plan,
            gemini,
            replicate,
        })
    }

    /// Where checkout and the billing portal send the user back to.
    pub fn settings_url(&self) -> String {
        let mut url = self.app_origin.clone();
        url.set_path("/settings");
        url.to_string()
    }
}
