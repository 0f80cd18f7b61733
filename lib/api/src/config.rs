//! HTTP client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for talking to the balance API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    /// Default: "http://localhost:3000/api"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    /// Default: 30
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Also notify the normalized message for error statuses other than
    /// 401, 403 and 429.
    #[serde(default)]
    pub notify_all_errors: bool,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            notify_all_errors: false,
        }
    }
}

impl ApiConfig {
    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_config_has_correct_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000/api");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.notify_all_errors);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ApiConfig = serde_json::from_str(r#"{"base_url":"https://bank.example/api"}"#)
            .expect("deserialize");
        assert_eq!(config.base_url, "https://bank.example/api");
        assert_eq!(config.timeout_secs, 30);
    }
}
