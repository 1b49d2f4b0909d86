use serde::Serialize;
use thiserror::Error;

/// Result type alias for CivicPulse operations.
pub type Result<T> = std::result::Result<T, CivicError>;

/// A single field-level validation failure, reported back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CivicError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("submission failed: {0}")]
    SubmissionFailed(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CivicError {
    /// Shorthand for a single-field validation failure.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}
