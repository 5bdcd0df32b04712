//! Seeder configuration
//!
//! This module handles loading the seeder's own configuration file,
//! applying environment overrides, and validation.

use crate::error::{ConfigSeedError, Result};
use crate::utils::retry::RetryOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked up in the configuration directory.
pub const CONFIG_FILE_NAME: &str = "configuration.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SeedConfig {
    /// Root directory scanned for configuration files
    pub config_path: PathBuf,
    pub global_prefix: String,
    pub consul_protocol: String,
    pub consul_host: String,
    pub consul_port: u16,
    pub consul_token: Option<String>,
    pub is_reset: bool,
    pub fail_limit: u32,
    /// Seconds to wait between two health-check attempts
    pub fail_wait_time: u64,
    /// Per-request HTTP timeout in seconds
    pub request_timeout: u64,
    pub acceptable_property_extensions: Vec<String>,
    pub yaml_extensions: Vec<String>,
    pub toml_extensions: Vec<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("./res/properties"),
            global_prefix: "config".to_string(),
            consul_protocol: "http".to_string(),
            consul_host: "localhost".to_string(),
            consul_port: 8500,
            consul_token: None,
            is_reset: false,
            fail_limit: 30,
            fail_wait_time: 3,
            request_timeout: 10,
            acceptable_property_extensions: vec![
                ".yaml".to_string(),
                ".yml".to_string(),
                ".properties".to_string(),
                ".toml".to_string(),
            ],
            yaml_extensions: vec![".yaml".to_string(), ".yml".to_string()],
            toml_extensions: vec![".toml".to_string()],
        }
    }
}

impl SeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.global_prefix.trim_matches('/').is_empty() {
            return Err(ConfigSeedError::invalid_config(
                "GlobalPrefix must not be empty; an empty prefix would address the whole store",
            ));
        }

        if self.consul_host.is_empty() {
            return Err(ConfigSeedError::invalid_config("ConsulHost is required"));
        }

        if self.consul_protocol != "http" && self.consul_protocol != "https" {
            return Err(ConfigSeedError::invalid_config(format!(
                "ConsulProtocol must be 'http' or 'https', got '{}'",
                self.consul_protocol
            )));
        }

        if self.acceptable_property_extensions.is_empty() {
            return Err(ConfigSeedError::invalid_config(
                "AcceptablePropertyExtensions must list at least one extension",
            ));
        }

        Ok(())
    }

    /// Base URL of the Consul agent, e.g. `http://localhost:8500`
    pub fn consul_url(&self) -> String {
        format!(
            "{}://{}:{}",
            self.consul_protocol, self.consul_host, self.consul_port
        )
    }

    /// Global prefix without surrounding slashes, so that joining with `/`
    /// never produces an empty segment.
    pub fn key_prefix(&self) -> &str {
        self.global_prefix.trim_matches('/')
    }

    pub fn retry_options(&self) -> RetryOptions {
        RetryOptions {
            max_attempts: self.fail_limit,
            interval: Duration::from_secs(self.fail_wait_time),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Location of the configuration file for an optional profile.
    /// Priority: explicit file > `<confdir>/<profile>/configuration.toml` >
    /// `<confdir>/configuration.toml`
    pub fn resolve_path(confdir: &Path, profile: Option<&str>, file: Option<&Path>) -> PathBuf {
        if let Some(file) = file {
            return file.to_path_buf();
        }

        match profile {
            Some(profile) if !profile.is_empty() => confdir.join(profile).join(CONFIG_FILE_NAME),
            _ => confdir.join(CONFIG_FILE_NAME),
        }
    }
}

/// Where the configuration comes from and which overrides apply.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub path: PathBuf,
    /// Apply `CONSUL_*` connection overrides from the environment
    pub use_consul_env: bool,
    /// Force a reset regardless of the file's `IsReset`
    pub force_reset: bool,
}

/// Load configuration with priority order:
/// 1. Command-line flags
/// 2. Environment variables (only with `use_consul_env`)
/// 3. Configuration file
/// 4. Default values
pub async fn load_config(options: &LoadOptions) -> Result<SeedConfig> {
    let mut config = load_from_file(&options.path).await?;

    if options.use_consul_env {
        load_from_env(&mut config, |name| std::env::var(name).ok())?;
    }

    if options.force_reset {
        config.is_reset = true;
    }

    config.validate()?;

    Ok(config)
}

async fn load_from_file(path: &Path) -> Result<SeedConfig> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        ConfigSeedError::config_load(format!("could not read {}: {}", path.display(), e))
    })?;

    parse_config(&contents).map_err(|e| {
        ConfigSeedError::config_load(format!("could not parse {}: {}", path.display(), e))
    })
}

/// Parse configuration text, trying TOML first and JSON as fallback.
pub fn parse_config(contents: &str) -> std::result::Result<SeedConfig, String> {
    match toml::from_str::<SeedConfig>(contents) {
        Ok(config) => Ok(config),
        Err(toml_error) => serde_json::from_str::<SeedConfig>(contents)
            .map_err(|_| toml_error.to_string()),
    }
}

fn load_from_env<F>(config: &mut SeedConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("CONSUL_PROTOCOL") {
        config.consul_protocol = value;
    }

    if let Some(value) = lookup("CONSUL_HOST") {
        config.consul_host = value;
    }

    if let Some(value) = lookup("CONSUL_PORT") {
        config.consul_port = value.parse::<u16>().map_err(|_| {
            ConfigSeedError::config_load(format!("CONSUL_PORT is not a valid port: '{}'", value))
        })?;
    }

    if let Some(value) = lookup("CONSUL_HTTP_TOKEN") {
        if !value.is_empty() {
            config.consul_token = Some(value);
        }
    }

    Ok(())
}
