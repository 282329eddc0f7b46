use async_trait::async_trait;

use crate::{
    app_error::AppResult,
    domain::entities::user::UserId,
};

/// Per-user free-tier counter.
///
/// `increment` must be a single atomic operation in the backing store;
/// concurrent increments for one user never lose an update.
#[async_trait]
pub trait UsageRepo: Send + Sync {
    /// Returns 0 when the user has no record yet.
    async fn get_count(&self, user_id: &UserId) -> AppResult<i64>;

    /// Creates the record with count 1 or adds 1, returning the new count.
    async fn increment(&self, user_id: &UserId) -> AppResult<i64>;
}
