use axum::{Router, routing::get};
use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
};

pub mod billing;
pub mod generation;
pub mod usage;
pub mod webhook;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(generation::router())
        .merge(usage::router())
        .merge(billing::router())
        .merge(webhook::router())
}

async fn health() -> &'static str {
    "ok"
}

/// Parse a JSON body after the caller has been authenticated. An empty body
/// reads as the payload's default.
pub(crate) fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid request body: {e}")))
}
