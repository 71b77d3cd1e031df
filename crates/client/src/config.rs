//! Client configuration.

use std::time::Duration;

/// Connection settings for the analysis service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Build a config for an explicit base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("SCAMSCOPE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let timeout_secs: u64 = std::env::var("SCAMSCOPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}
