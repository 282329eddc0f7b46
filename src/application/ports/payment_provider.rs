use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{app_error::AppResult, domain::entities::user::UserId};

// ============================================================================
// Port Types - Provider-agnostic billing types
// ============================================================================

/// Unique identifier for a customer in a payment provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a subscription in a payment provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the paid plan is priced at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanPrice {
    /// A price object that already exists in the provider's catalog.
    Catalog { price_id: String },
    /// Ad-hoc recurring price sent along with the checkout session.
    Inline {
        name: String,
        description: String,
        unit_amount_cents: i64,
        currency: String,
        interval: String,
    },
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub user_id: UserId,
    pub customer_email: Option<String>,
    pub price: PlanPrice,
    pub success_url: String,
    pub cancel_url: String,
}

/// A hosted provider page the user is redirected to (checkout or billing portal).
#[derive(Debug, Clone, Serialize)]
pub struct RedirectSession {
    pub url: String,
}

/// Snapshot of the provider's subscription object.
#[derive(Debug, Clone)]
pub struct ProviderSubscription {
    pub subscription_id: SubscriptionId,
    pub customer_id: CustomerId,
    pub price_id: String,
    pub current_period_end: DateTime<Utc>,
}

/// Authenticated webhook event, reduced to what the reconciler acts on.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone)]
pub enum WebhookPayload {
    CheckoutCompleted {
        user_id: Option<UserId>,
        subscription_id: Option<SubscriptionId>,
    },
    InvoicePaymentSucceeded {
        subscription_id: Option<SubscriptionId>,
    },
    Other,
}

// ============================================================================
// Port Trait
// ============================================================================

#[async_trait]
pub trait PaymentProviderPort: Send + Sync {
    async fn create_checkout(&self, request: &CheckoutRequest) -> AppResult<RedirectSession>;

    async fn create_portal_session(
        &self,
        customer: &CustomerId,
        return_url: &str,
    ) -> AppResult<RedirectSession>;

    /// Returns `None` when the provider does not know the subscription.
    async fn get_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> AppResult<Option<ProviderSubscription>>;

    /// Authenticate a raw webhook body against its signature header.
    fn verify_webhook(&self, payload: &str, signature_header: &str) -> AppResult<WebhookEvent>;
}
