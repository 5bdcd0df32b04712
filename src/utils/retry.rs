//! Bounded retry with a fixed wait between attempts
//!
//! Used for the start-up health check: the store may still be coming up
//! when the seeder starts, so a handful of spaced-out probes is tried
//! before giving up.

use crate::error::{ConfigSeedError, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryOptions {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(3),
        }
    }
}

/// Run `operation` until it succeeds or `max_attempts` attempts have failed.
///
/// A failed attempt is logged and followed by a sleep of `interval` when
/// another attempt remains. Zero attempts fails straight away.
pub async fn retry_with_fixed_wait<T, F, Fut>(mut operation: F, options: &RetryOptions) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < options.max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                attempts += 1;
                warn!(
                    "attempt {}/{} failed: {}",
                    attempts, options.max_attempts, error
                );
                last_error = Some(error);

                if attempts < options.max_attempts {
                    sleep(options.interval).await;
                }
            }
        }
    }

    Err(ConfigSeedError::ConnectionExhausted {
        attempts,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt was made".to_string()),
    })
}
