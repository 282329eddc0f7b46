use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use uuid::Uuid;

use super::user::UserId;

/// Local mirror of the payment provider's subscription object for one user.
///
/// Whether a record grants access is derived on read from the period end and
/// the price, never stored.
#[derive(Debug, Clone)]
pub struct SubscriptionRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub stripe_current_period_end: Option<DateTime<Utc>>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl SubscriptionRecord {
    /// True while `period_end + grace` is in the future and the record carries
    /// the paid price. When `paid_price_id` is `None` any non-empty price counts.
    pub fn is_active_at(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
        paid_price_id: Option<&str>,
    ) -> bool {
        let Some(price_id) = self.stripe_price_id.as_deref().filter(|p| !p.is_empty()) else {
            return false;
        };

        if let Some(expected) = paid_price_id {
            if price_id != expected {
                return false;
            }
        }

        match self.stripe_current_period_end {
            Some(period_end) => period_end + grace > now,
            None => false,
        }
    }

    pub fn has_customer(&self) -> bool {
        self.stripe_customer_id
            .as_deref()
            .is_some_and(|c| !c.is_empty())
    }
}
