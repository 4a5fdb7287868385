use rust_decimal::Decimal;

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computed distribution total differs from the entered payment amount
    /// beyond the currency tolerance; requires explicit caller confirmation
    #[error("Distribution mismatch: distributed {total_distributed} differs from payment amount {amount}")]
    DistributionMismatch {
        amount: Decimal,
        total_distributed: Decimal,
    },

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Persistence gateway failures outside of direct database errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Offline queue storage I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Offline action retried past its retry budget and removed from the queue
    #[error("Replay exhausted for action {action_id} after {attempts} failed attempts: {last_error}")]
    ReplayExhausted {
        action_id: String,
        attempts: u32,
        last_error: String,
    },

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        AppError::Persistence(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
