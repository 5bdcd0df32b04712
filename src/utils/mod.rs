//! Utility functions module
//!
//! HTTP client construction and the retry helper used by the store
//! connector.

pub mod network;
pub mod retry;

pub use network::*;
pub use retry::*;
