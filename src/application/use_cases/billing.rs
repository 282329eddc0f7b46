use std::sync::Arc;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{
        CheckoutRequest, CustomerId, PaymentProviderPort, PlanPrice, RedirectSession,
    },
    domain::entities::user::CurrentUser,
};

use super::subscription::SubscriptionRepo;

/// Entry point to the paid plan: checkout for new customers, billing portal
/// for anyone who already has a provider customer.
pub struct BillingUseCases {
    subscription_repo: Arc<dyn SubscriptionRepo>,
    payment_provider: Option<Arc<dyn PaymentProviderPort>>,
    plan_price: PlanPrice,
    settings_url: String,
}

impl BillingUseCases {
    pub fn new(
        subscription_repo: Arc<dyn SubscriptionRepo>,
        payment_provider: Option<Arc<dyn PaymentProviderPort>>,
        plan_price: PlanPrice,
        settings_url: String,
    ) -> Self {
        Self {
            subscription_repo,
            payment_provider,
            plan_price,
            settings_url,
        }
    }

    pub async fn billing_session(&self, user: &CurrentUser) -> AppResult<RedirectSession> {
        let provider = self
            .payment_provider
            .as_ref()
            .ok_or(AppError::ProviderNotConfigured("payment"))?;

        let existing = self.subscription_repo.get_by_user(&user.id).await?;

        if let Some(customer_id) = existing
            .as_ref()
            .filter(|s| s.has_customer())
            .and_then(|s| s.stripe_customer_id.clone())
        {
            tracing::debug!(user_id = %user.id, "Opening billing portal for existing customer");
            return provider
                .create_portal_session(&CustomerId::new(customer_id), &self.settings_url)
                .await;
        }

        tracing::debug!(user_id = %user.id, "Creating subscription checkout");
        provider
            .create_checkout(&CheckoutRequest {
                user_id: user.id.clone(),
                customer_email: user.email.clone(),
                price: self.plan_price.clone(),
                success_url: self.settings_url.clone(),
                cancel_url: self.settings_url.clone(),
            })
            .await
    }
}
