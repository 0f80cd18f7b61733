//! Session configuration.
//!
//! Fields with defaults can be omitted when loading from a file or from
//! environment variables.

use crate::credential::DEFAULT_TOKEN_KEY;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the identity comes from when a stored credential is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentitySource {
    /// Decode the credential's claims locally.
    #[default]
    Token,
    /// Ask the backend via `GET /auth/me`.
    Remote,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => f.write_str("token"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

impl FromStr for IdentitySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(Self::Token),
            "remote" => Ok(Self::Remote),
            other => Err(format!(
                "unknown identity source '{other}' (expected token or remote)"
            )),
        }
    }
}

/// Configuration for the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key the credential is stored under.
    /// Default: "client-balance-jwt"
    #[serde(default = "default_token_key")]
    pub token_key: String,
    /// Identity source used at initialization.
    #[serde(default)]
    pub identity_source: IdentitySource,
    /// Whether logout also calls `POST /auth/logout`.
    /// Default: true
    #[serde(default = "default_remote_logout")]
    pub remote_logout: bool,
    /// Credential file. `None` means the platform data directory.
    #[serde(default)]
    pub credential_file: Option<PathBuf>,
}

fn default_token_key() -> String {
    DEFAULT_TOKEN_KEY.to_string()
}

fn default_remote_logout() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: default_token_key(),
            identity_source: IdentitySource::default(),
            remote_logout: default_remote_logout(),
            credential_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.token_key, "client-balance-jwt");
        assert_eq!(config.identity_source, IdentitySource::Token);
        assert!(config.remote_logout);
        assert!(config.credential_file.is_none());
    }

    #[test]
    fn empty_object_uses_defaults() {
        let config: SessionConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn identity_source_parsing() {
        assert_eq!("Remote".parse::<IdentitySource>(), Ok(IdentitySource::Remote));
        assert_eq!("token".parse::<IdentitySource>(), Ok(IdentitySource::Token));
        assert!("cookie".parse::<IdentitySource>().is_err());
    }
}
