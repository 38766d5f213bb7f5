//! Shared primitives for all Rust crates in Agora.

#![forbid(unsafe_code)]

/// Caller primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::CallerContext;

/// Result type used across Agora crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
///
/// Adapter failures travel through the same enum and are propagated
/// unchanged by the services.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The member of a privilege change is neither a user nor a group.
    #[error("no user or group: {0}")]
    NoUserOrGroup(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable identifier surfaced to API clients.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid-data",
            Self::NoUserOrGroup(_) => "no-user-or-group",
            Self::NotFound(_) => "not-found",
            Self::Conflict(_) => "conflict",
            Self::Unauthorized(_) => "not-logged-in",
            Self::Forbidden(_) => "no-privileges",
            Self::Internal(_) => "internal-error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn request_errors_expose_stable_codes() {
        assert_eq!(
            AppError::Validation("privilege list is empty".to_owned()).code(),
            "invalid-data"
        );
        assert_eq!(
            AppError::NoUserOrGroup("ghost".to_owned()).code(),
            "no-user-or-group"
        );
    }
}
