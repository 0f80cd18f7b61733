//! Platform access and session management for client-balance.
//!
//! This crate provides:
//! - The signed-in user (`User`, `Role`, `UserStatus`)
//! - Credential storage (`CredentialSlot`, in memory or on disk)
//! - The shared session handle (`Session`) and its observable state
//! - The session store driving login, registration and logout (`SessionStore`)
//! - Routes and the guards protecting them (`Route`, `Guard`)
//!
//! # Access Control Model
//!
//! A user is signed in when an unexpired credential is stored and an
//! identity is held. Clients land on their accounts, admins on the user
//! console. Guards redirect anyone else.
//!
//! # Example
//!
//! ```
//! use client_balance_platform_access::{
//!     Guard, GuardOutcome, MemoryCredentialSlot, Route, Session,
//! };
//! use std::sync::Arc;
//!
//! let session = Session::new(Arc::new(MemoryCredentialSlot::default()));
//!
//! assert!(!session.is_authenticated());
//! assert_eq!(Guard::Admin.check(&session), GuardOutcome::Redirect(Route::Login));
//! assert_eq!(Guard::Guest.check(&session), GuardOutcome::Allow);
//! ```

pub mod auth;
pub mod config;
pub mod credential;
pub mod error;
pub mod role;
pub mod route;
pub mod session;
pub mod store;
pub mod token;
pub mod user;

// Re-export main types at crate root
pub use auth::{AuthBackend, AuthResponse, LoginRequest, RegisterRequest};
pub use config::{IdentitySource, SessionConfig};
pub use credential::{CredentialSlot, DEFAULT_TOKEN_KEY, FileCredentialSlot, MemoryCredentialSlot};
pub use error::{CredentialError, SessionError, TokenError};
pub use role::{Role, UserStatus};
pub use route::{Guard, GuardOutcome, Navigator, Route};
pub use session::{Session, SessionState};
pub use store::SessionStore;
pub use token::TokenClaims;
pub use user::User;
