//! Configuration management module
//!
//! This module handles loading the seeder's configuration from a
//! profile-specific file, environment overrides, and default values.

pub mod settings;

pub use settings::*;
