//! Error normalization for the client-balance platform.
//!
//! Backend failures arrive in many shapes: a bare status code, an English
//! sentence from the API, a transport error from the HTTP stack. This crate
//! turns any of them into one entry of a closed set of [`UserMessage`]s and
//! renders that entry for the configured [`Locale`].
//!
//! # Example
//!
//! ```
//! use client_balance_error_mapping::{ErrorMapper, Locale};
//!
//! let mapper = ErrorMapper::new(Locale::En);
//! assert_eq!(
//!     mapper.map_error_message("Insufficient Balance for withdrawal"),
//!     "Insufficient balance to complete this operation."
//! );
//! assert_eq!(
//!     mapper.map_by_status_code(404, None),
//!     "Resource not found."
//! );
//! ```

pub mod locale;
pub mod mapper;
pub mod message;

pub use locale::{Locale, ParseLocaleError};
pub use mapper::ErrorMapper;
pub use message::UserMessage;
