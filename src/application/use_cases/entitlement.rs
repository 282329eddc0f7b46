use std::sync::Arc;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{usage_record::UsageSummary, user::UserId},
};

use super::{subscription::SubscriptionUseCases, usage::UsageRepo};

/// Free-tier gate in front of every AI tool.
///
/// Subscribers short-circuit the counter entirely: the usage store is neither
/// read nor written for them.
pub struct EntitlementUseCases {
    usage_repo: Arc<dyn UsageRepo>,
    subscriptions: Arc<SubscriptionUseCases>,
    free_limit: i64,
}

impl EntitlementUseCases {
    pub fn new(
        usage_repo: Arc<dyn UsageRepo>,
        subscriptions: Arc<SubscriptionUseCases>,
        free_limit: i64,
    ) -> Self {
        Self {
            usage_repo,
            subscriptions,
            free_limit,
        }
    }

    pub fn free_limit(&self) -> i64 {
        self.free_limit
    }

    pub async fn get_count(&self, user_id: &UserId) -> AppResult<i64> {
        self.usage_repo.get_count(user_id).await
    }

    pub async fn increment(&self, user_id: &UserId) -> AppResult<i64> {
        self.usage_repo.increment(user_id).await
    }

    pub async fn is_subscription_active(&self, user_id: &UserId) -> AppResult<bool> {
        self.subscriptions.is_subscription_active(user_id).await
    }

    /// Storage errors propagate, so callers fail closed.
    pub async fn is_allowed(&self, user_id: &UserId) -> AppResult<bool> {
        if self.is_subscription_active(user_id).await? {
            return Ok(true);
        }
        let count = self.get_count(user_id).await?;
        Ok(count < self.free_limit)
    }

    pub async fn check(&self, user_id: &UserId) -> AppResult<()> {
        if self.is_allowed(user_id).await? {
            Ok(())
        } else {
            tracing::info!(user_id = %user_id, free_limit = self.free_limit, "Free limit reached");
            Err(AppError::FreeLimitReached)
        }
    }

    /// Meter one successful call. Subscription status is looked up again here,
    /// so a user who upgraded mid-request is not charged a free use.
    ///
    /// Returns the new count, or `None` for subscribers.
    pub async fn record_success(&self, user_id: &UserId) -> AppResult<Option<i64>> {
        if self.is_subscription_active(user_id).await? {
            return Ok(None);
        }
        let count = self.increment(user_id).await?;
        Ok(Some(count))
    }

    pub async fn usage_summary(&self, user_id: &UserId) -> AppResult<UsageSummary> {
        let is_pro = self.is_subscription_active(user_id).await?;
        let count = if is_pro {
            0
        } else {
            self.get_count(user_id).await?
        };
        Ok(UsageSummary {
            count,
            free_limit: self.free_limit,
            is_pro,
        })
    }
}
