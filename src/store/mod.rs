//! Key/value store access
//!
//! The `StoreClient` trait, its Consul implementation, and the health-checked
//! connection step that turns a client into a usable handle.

pub mod client;
pub mod consul;

pub use client::*;
pub use consul::*;

use tracing::info;

use crate::error::Result;
use crate::utils::retry::{retry_with_fixed_wait, RetryOptions};

/// Health-check `client` with bounded retry and hand it back once the
/// store answers.
///
/// Fails with `ConnectionExhausted` after `max_attempts` failed probes;
/// with `max_attempts == 0` no probe is sent at all.
pub async fn connect<C: StoreClient>(client: C, retry: &RetryOptions) -> Result<C> {
    retry_with_fixed_wait(|| client.health_check(), retry).await?;
    info!("store is reachable");
    Ok(client)
}
