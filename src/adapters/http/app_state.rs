use std::sync::Arc;

use crate::{
    application::use_cases::{
        billing::BillingUseCases, billing_webhook::BillingWebhookUseCases,
        entitlement::EntitlementUseCases, generation::GenerationUseCases,
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub entitlement_use_cases: Arc<EntitlementUseCases>,
    pub generation_use_cases: Arc<GenerationUseCases>,
    pub billing_use_cases: Arc<BillingUseCases>,
    pub billing_webhook_use_cases: Arc<BillingWebhookUseCases>,
}
