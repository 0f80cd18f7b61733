//! Reading claims out of a bearer credential.
//!
//! The balance API issues JWTs. The client never verifies signatures (it
//! holds no key); it only reads the payload to learn who is signed in and
//! when the credential stops being accepted. A credential that is not a
//! JWT is treated as opaque: no identity, no expiry.

use crate::error::TokenError;
use crate::role::{Role, UserStatus};
use crate::user::User;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use client_balance_core::UserId;
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Claims carried in a credential's payload segment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    /// Subject; some issuers put the user id here.
    #[serde(default)]
    pub sub: Option<JsonValue>,
    /// Explicit user id claim.
    #[serde(default)]
    pub id: Option<JsonValue>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    /// Expiry as seconds since the epoch.
    #[serde(default)]
    pub exp: Option<f64>,
    /// Issue time as seconds since the epoch.
    #[serde(default)]
    pub iat: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TokenClaims {
    /// Decodes the payload of a JWT without verifying it.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let mut segments = token.trim().split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| TokenError::InvalidEncoding {
                reason: e.to_string(),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| TokenError::InvalidClaims {
            reason: e.to_string(),
        })
    }

    /// Returns when the credential expires, if it says.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp
            .and_then(|secs| DateTime::from_timestamp(secs.floor() as i64, 0))
    }

    /// Returns true if `exp` is earlier than `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp < now)
    }

    /// Returns the user id from `id`, falling back to `sub`.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.id
            .as_ref()
            .and_then(id_from_json)
            .or_else(|| self.sub.as_ref().and_then(id_from_json))
    }

    /// Builds the identity these claims describe.
    pub fn to_user(&self) -> Result<User, TokenError> {
        let id = self.user_id().ok_or(TokenError::MissingClaim { claim: "id" })?;
        let email = self
            .email
            .clone()
            .ok_or(TokenError::MissingClaim { claim: "email" })?;

        Ok(User::new(
            id,
            self.name.clone().unwrap_or_default(),
            email,
            self.role.unwrap_or(Role::Unknown),
        )
        .with_status(self.status.unwrap_or_default())
        .with_timestamps(self.created_at, self.updated_at))
    }
}

fn id_from_json(value: &JsonValue) -> Option<UserId> {
    match value {
        JsonValue::Number(n) => n.as_i64().map(UserId::new),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Returns the expiry of a credential, or `None` for opaque credentials.
#[must_use]
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    TokenClaims::decode(token)
        .ok()
        .and_then(|claims| claims.expires_at())
}

/// Returns true if the credential carries an `exp` earlier than `now`.
#[must_use]
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    expires_at(token).is_some_and(|exp| exp < now)
}

/// Decodes the identity from a credential, rejecting expired ones.
pub fn identity_from_token(token: &str, now: DateTime<Utc>) -> Result<User, TokenError> {
    let claims = TokenClaims::decode(token)?;
    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }
    claims.to_user()
}

/// Builds an unsigned JWT from a claims object. Test helper.
#[cfg(test)]
pub(crate) fn unsigned_token(claims: &JsonValue) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.")
}
