use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
                None,
            ),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthenticated, None),
            AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidInput,
                Some(msg.clone()),
            ),
            AppError::FreeLimitReached => (
                StatusCode::FORBIDDEN,
                ErrorCode::FreeLimitReached,
                Some(self.to_string()),
            ),
            AppError::ProviderNotConfigured(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::ProviderNotConfigured,
                Some(self.to_string()),
            ),
            AppError::Provider(_) => (StatusCode::BAD_GATEWAY, ErrorCode::ProviderError, None),
            AppError::InvalidSignature(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidSignature, None)
            }
            AppError::UnattributedCheckout => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::UnattributedCheckout,
                None,
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, ErrorCode::NotFound, None),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                None,
            ),
        };

        // Log the error before it gets converted into a status response.
        if status.is_server_error() {
            tracing::error!(error = ?self, status = %status, "Request failed");
        } else {
            tracing::warn!(error = %self, status = %status, "Request rejected");
        }

        error_resp(status, code, message)
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
