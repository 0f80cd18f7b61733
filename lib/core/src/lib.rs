//! Core domain types and utilities for the client-balance platform.
//!
//! This crate provides the foundational types shared by every other crate:
//! strongly-typed identifiers, the raw API error signal, the `Result`
//! alias, and the input validation rules applied before a request is sent.

pub mod error;
pub mod id;
pub mod validate;

pub use error::{ApiError, Result};
pub use id::{AccountId, ParseIdError, TransactionId, UserId};
pub use validate::ValidationError;
