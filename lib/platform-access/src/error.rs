//! Error types for the platform-access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `SessionError`: failures of session operations (login, register, refresh)
//! - `CredentialError`: failures reading or writing the credential slot
//! - `TokenError`: a credential whose claims cannot be used

use client_balance_core::ApiError;
use std::fmt;

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The backend rejected the call; `message` is the normalized text.
    AuthenticationFailed { message: String, cause: ApiError },
    /// A later login, register or logout replaced this call before it resolved.
    Superseded,
    /// The operation needs a credential and none is stored.
    NotAuthenticated,
    /// The stored credential is expired or unreadable.
    InvalidCredential { reason: String },
    /// The credential slot could not be written.
    Storage { reason: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthenticationFailed { message, cause } => {
                write!(f, "{message} ({cause})")
            }
            Self::Superseded => write!(f, "superseded by a later session change"),
            Self::NotAuthenticated => write!(f, "not authenticated"),
            Self::InvalidCredential { reason } => {
                write!(f, "invalid credential: {reason}")
            }
            Self::Storage { reason } => write!(f, "credential storage failed: {reason}"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Errors from the credential slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Reading or writing the backing file failed.
    Io { path: String, reason: String },
    /// The backing file is not a JSON object of strings.
    Corrupt { path: String, reason: String },
    /// No location is available for the backing file.
    NoLocation,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => write!(f, "credential file {path}: {reason}"),
            Self::Corrupt { path, reason } => {
                write!(f, "credential file {path} is corrupt: {reason}")
            }
            Self::NoLocation => write!(f, "no data directory for the credential file"),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Errors from decoding credential claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not three dot-separated segments.
    Malformed,
    /// The payload segment is not valid base64url.
    InvalidEncoding { reason: String },
    /// The payload is not a JSON claims object.
    InvalidClaims { reason: String },
    /// A claim needed to build the identity is absent.
    MissingClaim { claim: &'static str },
    /// The `exp` claim is in the past.
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "token is not a JWT"),
            Self::InvalidEncoding { reason } => write!(f, "invalid token encoding: {reason}"),
            Self::InvalidClaims { reason } => write!(f, "invalid token claims: {reason}"),
            Self::MissingClaim { claim } => write!(f, "missing required claim: {claim}"),
            Self::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for TokenError {}
