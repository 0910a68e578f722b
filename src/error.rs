// SPDX-License-Identifier: MIT

//! Application error types.
//!
//! Failures fall into three buckets: validation errors caught before any
//! network call, remote-call failures surfaced to the user with local state
//! left untouched, and local storage failures. No operation retries; a
//! failed action must be re-triggered by the user.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Auth service error: {0}")]
    Auth(String),

    #[error("Workout store error: {0}")]
    Api(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors caused by a rejected or expired credential.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Unauthorized | AppError::InvalidToken)
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
