use sqlx::PgPool;

use crate::app_error::AppError;

pub mod subscription;
pub mod usage;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::InvalidInput("A record with this value already exists".into())
            }
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                AppError::InvalidInput("Value violates a table constraint".into())
            }
            _ => {
                // Details stay in the log, not in the response
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}
