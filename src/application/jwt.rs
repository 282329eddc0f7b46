use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::user::{CurrentUser, UserId};

/// Session token claims issued by the identity provider in front of the dashboard.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn into_current_user(self) -> AppResult<CurrentUser> {
        if self.sub.trim().is_empty() {
            return Err(AppError::Unauthenticated);
        }
        Ok(CurrentUser {
            id: UserId::new(self.sub),
            email: self.email,
        })
    }
}

pub fn verify(token: &str, secret: &SecretString) -> AppResult<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AppError::Unauthenticated
    })
}
