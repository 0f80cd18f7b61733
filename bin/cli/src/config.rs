//! Centralized CLI configuration.
//!
//! This module provides strongly-typed configuration for the command-line
//! client, loaded via the `config` crate from an optional TOML file and
//! environment variables. Environment variables win over the file.
//!
//! Variables use the `CLIENT_BALANCE_` prefix and `__` between nested keys,
//! e.g. `CLIENT_BALANCE_API__BASE_URL` or
//! `CLIENT_BALANCE_SESSION__IDENTITY_SOURCE`.
//!
//! See [`ApiConfig`] and [`SessionConfig`] for the individual sections.

use client_balance_api::ApiConfig;
use client_balance_error_mapping::Locale;
use client_balance_platform_access::SessionConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "CLIENT_BALANCE";

/// CLI configuration composed from library configs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
    /// HTTP client configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Language of user-facing messages.
    #[serde(default)]
    pub locale: Locale,
}

impl CliConfig {
    /// `<config dir>/client-balance/config.toml`, when a config dir exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("client-balance").join("config.toml"))
    }

    /// Loads configuration from the file and the process environment.
    ///
    /// An explicit `path` must exist; the default path is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or a value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with(path, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(default) = Self::default_path() {
                    builder = builder.add_source(config::File::from(default).required(false));
                }
            }
        }

        builder
            .add_source(
                environment
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
