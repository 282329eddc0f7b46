use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("You have reached the limit of free requests")]
    FreeLimitReached,

    #[error("{0} provider not configured")]
    ProviderNotConfigured(&'static str),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("Checkout session has no user attribution")]
    UnattributedCheckout,

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    Unauthenticated,
    InvalidInput,
    FreeLimitReached,
    ProviderNotConfigured,
    ProviderError,
    InvalidSignature,
    UnattributedCheckout,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::FreeLimitReached => "FREE_LIMIT_REACHED",
            ErrorCode::ProviderNotConfigured => "PROVIDER_NOT_CONFIGURED",
            ErrorCode::ProviderError => "PROVIDER_ERROR",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::UnattributedCheckout => "UNATTRIBUTED_CHECKOUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    /// Whether a webhook delivery that failed with this error should be
    /// redelivered by the payment provider.
    pub fn is_retryable(&self) -> bool {
        match self {
            // Transient, a redelivery may succeed
            AppError::Database(_) => true,
            AppError::Internal(_) => true,
            AppError::Provider(_) => true,

            AppError::Unauthenticated => false,
            AppError::InvalidInput(_) => false,
            AppError::FreeLimitReached => false,
            AppError::ProviderNotConfigured(_) => false,
            AppError::InvalidSignature(_) => false,
            AppError::UnattributedCheckout => false,
            AppError::NotFound => false,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
