//! Authentication payloads and the backend contract the session drives.
//!
//! The session store never talks HTTP itself. It calls an [`AuthBackend`],
//! which the API crate implements over the REST endpoints and tests
//! implement with scripted fakes.

use crate::role::Role;
use crate::user::User;
use async_trait::async_trait;
use client_balance_core::ApiError;
use serde::{Deserialize, Serialize};

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Body of `POST /auth/register`, also used for admin user creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegisterRequest {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role,
        }
    }
}

/// Successful login or registration: a credential and who it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Backend operations the session store needs.
///
/// Login and register are sent without a credential. `me` uses the stored
/// one. `logout` receives the credential explicitly because the local slot
/// is already cleared when it runs.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchanges email and password for a credential.
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    /// Creates a user and signs it in.
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;

    /// Fetches the identity behind the stored credential.
    async fn me(&self) -> Result<User, ApiError>;

    /// Tells the backend a credential is no longer in use.
    async fn logout(&self, credential: &str) -> Result<(), ApiError>;
}
