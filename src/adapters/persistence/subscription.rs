use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{SubscriptionRepo, SubscriptionSync},
    domain::entities::{subscription_record::SubscriptionRecord, user::UserId},
};

fn row_to_record(row: &sqlx::postgres::PgRow) -> SubscriptionRecord {
    SubscriptionRecord {
        id: row.get("id"),
        user_id: UserId::new(row.get::<String, _>("user_id")),
        stripe_customer_id: row.get("stripe_customer_id"),
        stripe_subscription_id: row.get("stripe_subscription_id"),
        stripe_price_id: row.get("stripe_price_id"),
        stripe_current_period_end: row.get("stripe_current_period_end"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, stripe_customer_id, stripe_subscription_id, stripe_price_id,
    stripe_current_period_end, created_at, updated_at
"#;

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn get_by_user(&self, user_id: &UserId) -> AppResult<Option<SubscriptionRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_subscriptions WHERE user_id = $1",
            SELECT_COLS
        ))
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn upsert_for_user(
        &self,
        user_id: &UserId,
        sync: &SubscriptionSync,
    ) -> AppResult<SubscriptionRecord> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_subscriptions (
                id, user_id, stripe_customer_id, stripe_subscription_id,
                stripe_price_id, stripe_current_period_end
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                stripe_customer_id = EXCLUDED.stripe_customer_id,
                stripe_subscription_id = EXCLUDED.stripe_subscription_id,
                stripe_price_id = EXCLUDED.stripe_price_id,
                stripe_current_period_end = EXCLUDED.stripe_current_period_end,
                updated_at = NOW()
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id.as_str())
        .bind(&sync.stripe_customer_id)
        .bind(&sync.stripe_subscription_id)
        .bind(&sync.stripe_price_id)
        .bind(sync.stripe_current_period_end)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_record(&row))
    }

    async fn update_by_subscription_id(
        &self,
        stripe_subscription_id: &str,
        stripe_price_id: &str,
        stripe_current_period_end: DateTime<Utc>,
    ) -> AppResult<Option<SubscriptionRecord>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE user_subscriptions
            SET stripe_price_id = $2,
                stripe_current_period_end = $3,
                updated_at = NOW()
            WHERE stripe_subscription_id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(stripe_subscription_id)
        .bind(stripe_price_id)
        .bind(stripe_current_period_end)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_record))
    }
}
