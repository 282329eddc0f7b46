use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::{
    app_error::AppResult,
    domain::entities::{subscription_record::SubscriptionRecord, user::UserId},
};

/// Provider-side subscription state to be mirrored into the local record.
#[derive(Debug, Clone)]
pub struct SubscriptionSync {
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub stripe_price_id: String,
    pub stripe_current_period_end: DateTime<Utc>,
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn get_by_user(&self, user_id: &UserId) -> AppResult<Option<SubscriptionRecord>>;

    /// Insert or overwrite the single record keyed by `user_id`.
    async fn upsert_for_user(
        &self,
        user_id: &UserId,
        sync: &SubscriptionSync,
    ) -> AppResult<SubscriptionRecord>;

    /// Refresh price and period end on the record holding this subscription id.
    /// Returns `None` when no record matches.
    async fn update_by_subscription_id(
        &self,
        stripe_subscription_id: &str,
        stripe_price_id: &str,
        stripe_current_period_end: DateTime<Utc>,
    ) -> AppResult<Option<SubscriptionRecord>>;
}

/// What counts as a paying subscriber.
#[derive(Debug, Clone)]
pub struct SubscriptionPolicy {
    pub grace: Duration,
    /// Known paid price id. `None` accepts any non-empty price.
    pub paid_price_id: Option<String>,
}

impl Default for SubscriptionPolicy {
    fn default() -> Self {
        Self {
            grace: Duration::days(1),
            paid_price_id: None,
        }
    }
}

pub struct SubscriptionUseCases {
    repo: Arc<dyn SubscriptionRepo>,
    policy: SubscriptionPolicy,
}

impl SubscriptionUseCases {
    pub fn new(repo: Arc<dyn SubscriptionRepo>, policy: SubscriptionPolicy) -> Self {
        Self { repo, policy }
    }

    pub async fn is_subscription_active(&self, user_id: &UserId) -> AppResult<bool> {
        self.is_active_at(user_id, Utc::now()).await
    }

    pub async fn is_active_at(&self, user_id: &UserId, now: DateTime<Utc>) -> AppResult<bool> {
        let Some(record) = self.repo.get_by_user(user_id).await? else {
            return Ok(false);
        };
        Ok(record.is_active_at(
            now,
            self.policy.grace,
            self.policy.paid_price_id.as_deref(),
        ))
    }
}
