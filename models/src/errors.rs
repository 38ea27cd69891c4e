// models/src/errors.rs

use serde::{Deserialize, Serialize};
pub use thiserror::Error;

/// Every failure the scheduling core can surface. Each variant maps onto one
/// category of the public error taxonomy and, at the HTTP edge, one status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum SchedulingError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),
    /// The store refused the mutation: slot race lost, delete blocked by a booking.
    #[error("{0}")]
    Conflict(String),
    /// Same-day duplicate on the override path. Carries the time already booked
    /// so the caller can resubmit with `force`.
    #[error("duplicate booking detected for this beneficiary today at {hora}")]
    DuplicateEntry { hora: String },
    #[error("{0}")]
    NotFound(String),
    /// No usable credentials were presented.
    #[error("{0}")]
    Unauthenticated(String),
    /// Credentials were presented but rejected, or the role may not do this.
    #[error("{0}")]
    Forbidden(String),
    /// The patient directory or its token endpoint failed.
    #[error("upstream error: {message}")]
    Upstream { status: Option<u16>, message: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An internal error occurred: {0}")]
    Internal(String),
}

impl SchedulingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SchedulingError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        SchedulingError::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        SchedulingError::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        SchedulingError::Storage(msg.into())
    }

    /// True for failures caused by the store or the process itself rather than
    /// by the caller's input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            SchedulingError::Storage(_) | SchedulingError::Internal(_) | SchedulingError::Configuration(_)
        )
    }
}

impl From<chrono::ParseError> for SchedulingError {
    fn from(err: chrono::ParseError) -> Self {
        SchedulingError::Validation(format!("invalid date or time: {}", err))
    }
}

impl From<serde_json::Error> for SchedulingError {
    fn from(err: serde_json::Error) -> Self {
        SchedulingError::Internal(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for SchedulingError {
    fn from(err: std::io::Error) -> Self {
        SchedulingError::Internal(format!("IO error: {}", err))
    }
}

/// A type alias for a `Result` that returns a `SchedulingError` on failure.
pub type SchedulingResult<T> = Result<T, SchedulingError>;
