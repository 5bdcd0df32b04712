//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use config_seed::config::SeedConfig;
use config_seed::store::StoreClient;
use config_seed::{ConfigSeedError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory stand-in for the Consul KV store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    pub health_checks: AtomicUsize,
    pub puts: AtomicUsize,
    pub healthy: bool,
    pub fail_keys: bool,
}

impl MemoryStore {
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Healthy, but every key listing fails.
    pub fn failing_keys() -> Self {
        Self {
            healthy: true,
            fail_keys: true,
            ..Default::default()
        }
    }

    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let store = Self::healthy();
        {
            let mut map = store.entries.lock().unwrap();
            for (k, v) in entries {
                map.insert(k.to_string(), v.as_bytes().to_vec());
            }
        }
        store
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), String::from_utf8_lossy(v).into_owned()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.snapshot().get(key).cloned()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn health_check(&self) -> Result<()> {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        if self.healthy {
            Ok(())
        } else {
            Err(ConfigSeedError::store_unavailable("Connection refused"))
        }
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        if self.fail_keys {
            return Err(ConfigSeedError::query("Invalid consul kv"));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete_tree(&self, prefix: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .retain(|k, _| !k.starts_with(prefix));
        Ok(())
    }
}

pub fn config_for(root: &Path) -> SeedConfig {
    SeedConfig {
        config_path: root.to_path_buf(),
        global_prefix: "config".to_string(),
        fail_limit: 3,
        fail_wait_time: 0,
        ..Default::default()
    }
}

pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}
