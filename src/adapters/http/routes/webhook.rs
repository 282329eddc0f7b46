use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use tracing::{error, info, warn};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
};

const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(handle_webhook))
}

/// Returns 500 so the payment provider redelivers the event.
fn webhook_retryable_error(error: &AppError) -> StatusCode {
    error!(
        error = %error,
        retryable = true,
        "Webhook processing failed, returning 500 for redelivery"
    );
    StatusCode::INTERNAL_SERVER_ERROR
}

/// POST /api/webhook
///
/// The body is taken as a raw string: the signature covers the exact bytes.
async fn handle_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<StatusCode> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match app_state
        .billing_webhook_use_cases
        .handle(&body, signature)
        .await
    {
        Ok((event, outcome)) => {
            info!(
                event_id = %event.id,
                event_type = %event.event_type,
                outcome = ?outcome,
                "Webhook processed"
            );
            Ok(StatusCode::OK)
        }
        Err(
            e @ (AppError::InvalidSignature(_)
            | AppError::UnattributedCheckout
            | AppError::ProviderNotConfigured(_)),
        ) => Err(e),
        Err(e) if e.is_retryable() => Ok(webhook_retryable_error(&e)),
        Err(e) => {
            warn!(
                error = %e,
                retryable = false,
                "Webhook event not applied, acknowledging"
            );
            Ok(StatusCode::OK)
        }
    }
}
