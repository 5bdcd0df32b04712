//! Key/value store client trait
//!
//! The seeder only needs four operations from the store. Keeping them
//! behind a trait lets the controller and importer run against Consul in
//! production and against fakes in tests.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Probe the agent; `Ok` only for a 2xx answer.
    async fn health_check(&self) -> Result<()>;

    /// List every key starting with `prefix`. An empty list means nothing
    /// is stored under it.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Store a single key/value pair.
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete every key starting with `prefix`.
    async fn delete_tree(&self, prefix: &str) -> Result<()>;
}

#[async_trait]
impl<T: StoreClient + ?Sized> StoreClient for Arc<T> {
    async fn health_check(&self) -> Result<()> {
        (**self).health_check().await
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys(prefix).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value).await
    }

    async fn delete_tree(&self, prefix: &str) -> Result<()> {
        (**self).delete_tree(prefix).await
    }
}
