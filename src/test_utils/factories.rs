//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use chrono::{Duration, NaiveDateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::{ExposeSecret, SecretString};
use time::OffsetDateTime;
use url::Url;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        jwt::Claims,
        ports::payment_provider::{CustomerId, ProviderSubscription, SubscriptionId},
    },
    domain::entities::{subscription_record::SubscriptionRecord, user::UserId},
    infra::config::{AppConfig, ProPlanConfig},
};

pub const TEST_JWT_SECRET: &str = "test_identity_jwt_secret";

/// Create a subscription record that is active right now.
pub fn create_test_subscription(
    user_id: &UserId,
    overrides: impl FnOnce(&mut SubscriptionRecord),
) -> SubscriptionRecord {
    let mut record = SubscriptionRecord {
        id: Uuid::new_v4(),
        user_id: user_id.clone(),
        stripe_customer_id: Some("cus_test123".to_string()),
        stripe_subscription_id: Some("sub_test123".to_string()),
        stripe_price_id: Some("price_pro".to_string()),
        stripe_current_period_end: Some(Utc::now() + Duration::days(30)),
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut record);
    record
}

/// Create the provider-side view of a paid subscription.
pub fn create_test_provider_subscription(
    overrides: impl FnOnce(&mut ProviderSubscription),
) -> ProviderSubscription {
    let mut subscription = ProviderSubscription {
        subscription_id: SubscriptionId::new("sub_test123"),
        customer_id: CustomerId::new("cus_test123"),
        price_id: "price_pro".to_string(),
        current_period_end: Utc::now() + Duration::days(30),
    };
    overrides(&mut subscription);
    subscription
}

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
        database_url: String::new(),
        db_max_connections: 1,
        app_origin: Url::parse("http://localhost:3000").unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        identity_jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
        free_limit: 5,
        subscription_grace: Duration::hours(24),
        stripe: None,
        pro_plan: ProPlanConfig::default(),
        gemini: None,
        replicate: None,
    }
}

/// Sign an HS256 session token the way the identity provider does.
pub fn issue_token(
    user_id: &UserId,
    email: Option<&str>,
    secret: &SecretString,
    ttl: time::Duration,
) -> AppResult<String> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.map(str::to_string),
        iat: now,
        exp: now + ttl.whole_seconds(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

/// Session token for `user_id`, signed with the test identity secret.
pub fn test_token(user_id: &str) -> String {
    issue_token(
        &UserId::new(user_id),
        Some(&format!("{user_id}@example.com")),
        &SecretString::new(TEST_JWT_SECRET.into()),
        time::Duration::hours(1),
    )
    .unwrap()
}

fn test_datetime() -> NaiveDateTime {
    Utc::now().naive_utc()
}
