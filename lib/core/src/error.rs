//! Error handling foundation for the client-balance platform.
//!
//! This module provides the `Result` type alias using rootcause and the raw
//! error signal produced by every HTTP call. Each crate defines its own
//! domain-specific error types in its own error module; `ApiError` lives
//! here because the session store, the request pipeline and the error
//! normalizer all inspect it.

use rootcause::Report;
use std::fmt;

/// A Result type alias using rootcause's Report for error handling.
///
/// Each layer adds its own context via `.context()` as errors propagate.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

/// A failed call against the balance API.
///
/// This is the raw signal; user-facing text is produced from it by the
/// error-mapping crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, TLS).
    Transport { reason: String },
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The server answered with a non-success status.
    Status {
        status: u16,
        message: Option<String>,
    },
    /// The response body did not have the expected shape.
    Decode { reason: String },
}

impl ApiError {
    /// Creates a status failure with an optional server message.
    #[must_use]
    pub fn status(status: u16, message: Option<String>) -> Self {
        Self::Status { status, message }
    }

    /// Returns the HTTP status code, if the server answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the free-text message carried by the failure, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            Self::Transport { reason } => Some(reason),
            Self::Timeout => Some("timeout"),
            Self::Decode { .. } => None,
        }
    }

    /// Returns true for a 401 response.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { reason } => write!(f, "request failed: {reason}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Status {
                status,
                message: Some(message),
            } => write!(f, "server returned {status}: {message}"),
            Self::Status {
                status,
                message: None,
            } => write!(f, "server returned {status}"),
            Self::Decode { reason } => write!(f, "unexpected response body: {reason}"),
        }
    }
}

impl std::error::Error for ApiError {}
