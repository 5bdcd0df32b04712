//! CLI module for config-seed
//!
//! Command-line arguments and the wiring from flags to a seeding run.

pub mod commands;

pub use commands::*;
