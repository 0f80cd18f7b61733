//! Error types for the account and user services.

use client_balance_core::{ApiError, ValidationError};
use std::fmt;

/// Errors from service operations.
///
/// Both variants carry the normalized message that was also stored in the
/// service state.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The API call failed.
    Request { message: String, cause: ApiError },
    /// The input was rejected before any request was sent.
    Invalid {
        message: String,
        reason: ValidationError,
    },
}

impl ServiceError {
    /// Returns the normalized, user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Request { message, .. } | Self::Invalid { message, .. } => message,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { message, cause } => write!(f, "{message} ({cause})"),
            Self::Invalid { message, reason } => write!(f, "{message} ({reason})"),
        }
    }
}

impl std::error::Error for ServiceError {}
