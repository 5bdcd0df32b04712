use crate::error::{ConfigSeedError, Result};
use reqwest::Client;
use std::time::Duration;

/// Configuration for HTTP client with proper timeouts
pub struct NetworkConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            user_agent: format!("config-seed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a properly configured HTTP client with timeouts
pub fn create_http_client(config: &NetworkConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| {
            ConfigSeedError::store_unavailable(format!("Failed to create HTTP client: {}", e))
        })
}

/// Turn a transport failure into a short, user-facing message.
pub fn describe_network_error(error: &reqwest::Error, url: &str) -> String {
    if error.is_timeout() {
        return format!("request to {} timed out", url);
    }

    if error.is_connect() {
        if error
            .to_string()
            .to_lowercase()
            .contains("connection refused")
        {
            return format!("connection to {} was refused", url);
        }
        return format!("failed to connect to {}: {}", url, error);
    }

    if let Some(status) = error.status() {
        return format!("{} answered HTTP {}", url, status);
    }

    format!("request to {} failed: {}", url, error)
}
