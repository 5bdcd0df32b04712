//! config-seed - Consul configuration seeder
//!
//! Imports `.properties`, YAML and TOML files from a directory tree into a
//! Consul key/value store under a global prefix, once per store unless a
//! reset is requested.

pub mod cli;
pub mod config;
pub mod error;
pub mod seed;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use error::{ConfigSeedError, ErrorKind, Result};
