//! In-memory mock for the subscription record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{SubscriptionRepo, SubscriptionSync},
    domain::entities::{subscription_record::SubscriptionRecord, user::UserId},
};

// ============================================================================
// InMemorySubscriptionRepo
// ============================================================================

/// Keyed by user id, with the same uniqueness rules as the
/// `user_subscriptions` table.
#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    pub records: Mutex<HashMap<UserId, SubscriptionRecord>>,
    failing: AtomicBool,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SubscriptionRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.user_id.clone(), r))
            .collect();
        Self {
            records: Mutex::new(map),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_failing(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Database("subscription store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn get_by_user(&self, user_id: &UserId) -> AppResult<Option<SubscriptionRecord>> {
        self.check_failing()?;
        Ok(self.records.lock().unwrap().get(user_id).cloned())
    }

    async fn upsert_for_user(
        &self,
        user_id: &UserId,
        sync: &SubscriptionSync,
    ) -> AppResult<SubscriptionRecord> {
        self.check_failing()?;
        let mut records = self.records.lock().unwrap();

        let taken = records.values().any(|r| {
            &r.user_id != user_id
                && r.stripe_subscription_id.as_deref() == Some(sync.stripe_subscription_id.as_str())
        });
        if taken {
            return Err(AppError::InvalidInput(
                "Subscription already belongs to another user".into(),
            ));
        }

        let now = Utc::now().naive_utc();
        let record = records
            .entry(user_id.clone())
            .or_insert_with(|| SubscriptionRecord {
                id: Uuid::new_v4(),
                user_id: user_id.clone(),
                stripe_customer_id: None,
                stripe_subscription_id: None,
                stripe_price_id: None,
                stripe_current_period_end: None,
                created_at: Some(now),
                updated_at: Some(now),
            });
        record.stripe_customer_id = Some(sync.stripe_customer_id.clone());
        record.stripe_subscription_id = Some(sync.stripe_subscription_id.clone());
        record.stripe_price_id = Some(sync.stripe_price_id.clone());
        record.stripe_current_period_end = Some(sync.stripe_current_period_end);
        record.updated_at = Some(now);
        Ok(record.clone())
    }

    async fn update_by_subscription_id(
        &self,
        stripe_subscription_id: &str,
        stripe_price_id: &str,
        stripe_current_period_end: DateTime<Utc>,
    ) -> AppResult<Option<SubscriptionRecord>> {
        self.check_failing()?;
        let mut records = self.records.lock().unwrap();
        let Some(record) = records
            .values_mut()
            .find(|r| r.stripe_subscription_id.as_deref() == Some(stripe_subscription_id))
        else {
            return Ok(None);
        };
        record.stripe_price_id = Some(stripe_price_id.to_string());
        record.stripe_current_period_end = Some(stripe_current_period_end);
        record.updated_at = Some(Utc::now().naive_utc());
        Ok(Some(record.clone()))
    }
}
