use std::sync::Arc;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{
        PaymentProviderPort, SubscriptionId, WebhookEvent, WebhookPayload,
    },
    domain::entities::user::UserId,
};

use super::subscription::{SubscriptionRepo, SubscriptionSync};

/// Result of reconciling one authenticated event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    SubscriptionUpserted,
    SubscriptionRenewed,
    /// Renewal for a subscription id with no local record.
    OrphanRenewal,
    /// Authenticated but nothing to do.
    Ignored,
}

/// Keeps the local subscription record an idempotent mirror of the payment
/// provider. Safe under at-least-once delivery: every write is an upsert or
/// an update keyed by the provider's ids.
pub struct BillingWebhookUseCases {
    subscription_repo: Arc<dyn SubscriptionRepo>,
    payment_provider: Option<Arc<dyn PaymentProviderPort>>,
}

impl BillingWebhookUseCases {
    pub fn new(
        subscription_repo: Arc<dyn SubscriptionRepo>,
        payment_provider: Option<Arc<dyn PaymentProviderPort>>,
    ) -> Self {
        Self {
            subscription_repo,
            payment_provider,
        }
    }

    /// Verify and reconcile a raw webhook delivery. Nothing is written unless
    /// the signature checks out.
    pub async fn handle(
        &self,
        payload: &str,
        signature_header: Option<&str>,
    ) -> AppResult<(WebhookEvent, WebhookOutcome)> {
        let provider = self
            .payment_provider
            .as_ref()
            .ok_or(AppError::ProviderNotConfigured("payment"))?;

        let signature = signature_header
            .ok_or_else(|| AppError::InvalidSignature("Missing signature header".into()))?;

        let event = provider.verify_webhook(payload, signature)?;
        let outcome = self.reconcile(&**provider, &event).await?;
        Ok((event, outcome))
    }

    async fn reconcile(
        &self,
        provider: &dyn PaymentProviderPort,
        event: &WebhookEvent,
    ) -> AppResult<WebhookOutcome> {
        match &event.payload {
            WebhookPayload::CheckoutCompleted {
                user_id,
                subscription_id,
            } => {
                self.checkout_completed(provider, event, user_id.as_ref(), subscription_id.as_ref())
                    .await
            }
            WebhookPayload::InvoicePaymentSucceeded { subscription_id } => {
                self.invoice_payment_succeeded(provider, event, subscription_id.as_ref())
                    .await
            }
            WebhookPayload::Other => {
                tracing::debug!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "Unhandled webhook event type"
                );
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn checkout_completed(
        &self,
        provider: &dyn PaymentProviderPort,
        event: &WebhookEvent,
        user_id: Option<&UserId>,
        subscription_id: Option<&SubscriptionId>,
    ) -> AppResult<WebhookOutcome> {
        let Some(user_id) = user_id else {
            tracing::error!(
                event_id = %event.id,
                retryable = false,
                "Checkout completed without metadata.userId"
            );
            return Err(AppError::UnattributedCheckout);
        };

        let Some(subscription_id) = subscription_id else {
            tracing::debug!(event_id = %event.id, "Checkout completed without a subscription");
            return Ok(WebhookOutcome::Ignored);
        };

        let Some(subscription) = provider.get_subscription(subscription_id).await? else {
            tracing::warn!(
                event_id = %event.id,
                subscription_id = %subscription_id,
                retryable = false,
                "Subscription from checkout not found at provider"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        let sync = SubscriptionSync {
            stripe_customer_id: subscription.customer_id.0,
            stripe_subscription_id: subscription.subscription_id.0,
            stripe_price_id: subscription.price_id,
            stripe_current_period_end: subscription.current_period_end,
        };

        let record = self.subscription_repo.upsert_for_user(user_id, &sync).await?;

        tracing::info!(
            event_id = %event.id,
            user_id = %user_id,
            subscription_id = %sync.stripe_subscription_id,
            period_end = ?record.stripe_current_period_end,
            "Subscription activated from checkout"
        );
        Ok(WebhookOutcome::SubscriptionUpserted)
    }

    async fn invoice_payment_succeeded(
        &self,
        provider: &dyn PaymentProviderPort,
        event: &WebhookEvent,
        subscription_id: Option<&SubscriptionId>,
    ) -> AppResult<WebhookOutcome> {
        let Some(subscription_id) = subscription_id else {
            tracing::debug!(event_id = %event.id, "Invoice paid without a subscription");
            return Ok(WebhookOutcome::Ignored);
        };

        let Some(subscription) = provider.get_subscription(subscription_id).await? else {
            tracing::warn!(
                event_id = %event.id,
                subscription_id = %subscription_id,
                retryable = false,
                "Renewed subscription not found at provider"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        let updated = self
            .subscription_repo
            .update_by_subscription_id(
                subscription.subscription_id.as_str(),
                &subscription.price_id,
                subscription.current_period_end,
            )
            .await?;

        match updated {
            Some(record) => {
                tracing::info!(
                    event_id = %event.id,
                    user_id = %record.user_id,
                    subscription_id = %subscription_id,
                    period_end = ?record.stripe_current_period_end,
                    "Subscription renewed"
                );
                Ok(WebhookOutcome::SubscriptionRenewed)
            }
            None => {
                tracing::warn!(
                    event_id = %event.id,
                    subscription_id = %subscription_id,
                    orphan_renewal = true,
                    "Renewal for unknown subscription, skipping"
                );
                Ok(WebhookOutcome::OrphanRenewal)
            }
        }
    }
}
