use std::path::PathBuf;
use thiserror::Error;

/// Main error type for config-seed operations
#[derive(Debug, Error)]
pub enum ConfigSeedError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot get connection to Consul after {attempts} attempt(s): {last_error}")]
    ConnectionExhausted { attempts: u32, last_error: String },

    #[error("Consul is not available: {0}")]
    StoreUnavailable(String),

    #[error("Consul query failed: {0}")]
    Query(String),

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Could not read {}: {source}", path.display())]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write key '{key}': {message}")]
    Write { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error classification for callers that need a stable status
/// instead of matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigLoad,
    ConnectionExhausted,
    Query,
    Parse,
    Write,
    Io,
}

impl ConfigSeedError {
    pub fn config_load<S: Into<String>>(msg: S) -> Self {
        Self::ConfigLoad(msg.into())
    }

    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn store_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn query<S: Into<String>>(msg: S) -> Self {
        Self::Query(msg.into())
    }

    pub fn parse<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn missing_file<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::MissingFile {
            path: path.into(),
            source,
        }
    }

    pub fn write<K: Into<String>, S: Into<String>>(key: K, message: S) -> Self {
        Self::Write {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigLoad(_) | Self::InvalidConfig(_) => ErrorKind::ConfigLoad,
            Self::ConnectionExhausted { .. } => ErrorKind::ConnectionExhausted,
            Self::StoreUnavailable(_) | Self::Query(_) => ErrorKind::Query,
            Self::Parse { .. } | Self::MissingFile { .. } => ErrorKind::Parse,
            Self::Write { .. } => ErrorKind::Write,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for config-seed operations
pub type Result<T> = std::result::Result<T, ConfigSeedError>;
