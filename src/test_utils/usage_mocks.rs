//! In-memory mock for the usage counter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::usage::UsageRepo,
    domain::entities::user::UserId,
};

// ============================================================================
// InMemoryUsageRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUsageRepo {
    pub counts: Mutex<HashMap<UserId, i64>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    failing: AtomicBool,
    failing_writes: AtomicBool,
}

impl InMemoryUsageRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counts(counts: Vec<(UserId, i64)>) -> Self {
        Self {
            counts: Mutex::new(counts.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Fail every call with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fail only `increment`.
    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    pub fn count_of(&self, user_id: &UserId) -> i64 {
        self.counts
            .lock()
            .unwrap()
            .get(user_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_failing(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Database("usage store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UsageRepo for InMemoryUsageRepo {
    async fn get_count(&self, user_id: &UserId) -> AppResult<i64> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        Ok(self.count_of(user_id))
    }

    async fn increment(&self, user_id: &UserId) -> AppResult<i64> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("usage store rejected write".into()));
        }

        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(user_id.clone()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}
