use async_trait::async_trait;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::usage::UsageRepo,
    domain::entities::user::UserId,
};

#[async_trait]
impl UsageRepo for PostgresPersistence {
    async fn get_count(&self, user_id: &UserId) -> AppResult<i64> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT count FROM user_api_limits WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::from)?;
        Ok(count.unwrap_or(0))
    }

    async fn increment(&self, user_id: &UserId) -> AppResult<i64> {
        // Single statement so concurrent increments serialize on the row lock.
        let count: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO user_api_limits (user_id, count)
            VALUES ($1, 1)
            ON CONFLICT (user_id) DO UPDATE
                SET count = user_api_limits.count + 1,
                    updated_at = NOW()
            RETURNING count
            "#,
        )
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(count)
    }
}
