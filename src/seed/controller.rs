//! Seeding controller
//!
//! Decides between a no-op, a plain import, and a reset followed by an
//! import, then drives the directory importer.

use tracing::{error, info, warn};

use crate::config::SeedConfig;
use crate::error::Result;
use crate::seed::formats::FormatResolver;
use crate::seed::importer::{import_directory, ImportReport};
use crate::store::StoreClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Keys already exist under the prefix and no reset was requested.
    AlreadyInitialized,
    Seeded { report: ImportReport, reset: bool },
}

pub struct Seeder<C: StoreClient> {
    config: SeedConfig,
    store: C,
    resolver: FormatResolver,
}

impl<C: StoreClient> Seeder<C> {
    pub fn new(config: SeedConfig, store: C) -> Self {
        let resolver = FormatResolver::from_config(&config);
        Self {
            config,
            store,
            resolver,
        }
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    /// Prefix every seeded key starts with. The trailing `/` keeps the
    /// listing and the reset from touching siblings such as `configuration/`.
    fn tree_prefix(&self) -> String {
        format!("{}/", self.config.key_prefix())
    }

    pub async fn run(&self) -> Result<SeedOutcome> {
        let reset = self.config.is_reset;

        if reset {
            self.remove_stored_config().await;
        } else if self.is_initialized().await {
            return Ok(SeedOutcome::AlreadyInitialized);
        }

        let report = import_directory(
            &self.store,
            &self.config.config_path,
            self.config.key_prefix(),
            &self.resolver,
        )
        .await
        .map_err(|e| {
            error!("import aborted: {}", e);
            e
        })?;

        info!(
            "imported {} key(s) from {} file(s) under '{}'",
            report.keys,
            report.files,
            self.config.key_prefix()
        );
        Ok(SeedOutcome::Seeded { report, reset })
    }

    /// Whether any key exists under the prefix. A failed query counts as
    /// not initialized so the import still runs.
    pub async fn is_initialized(&self) -> bool {
        let prefix = self.tree_prefix();
        match self.store.keys(&prefix).await {
            Ok(keys) if !keys.is_empty() => {
                info!(
                    "{} exists! The configuration data has been initialized.",
                    self.config.key_prefix()
                );
                true
            }
            Ok(_) => {
                info!(
                    "{} doesn't exist! Start importing configuration data.",
                    self.config.key_prefix()
                );
                false
            }
            Err(e) => {
                warn!("could not check {}: {}; importing anyway", prefix, e);
                false
            }
        }
    }

    /// Delete everything under the prefix. Returns `false` when the delete
    /// failed; the caller imports regardless.
    pub async fn remove_stored_config(&self) -> bool {
        let prefix = self.tree_prefix();
        match self.store.delete_tree(&prefix).await {
            Ok(()) => {
                info!(
                    "All values under the globalPrefix(\"{}\") are removed.",
                    self.config.key_prefix()
                );
                true
            }
            Err(e) => {
                error!("reset of {} failed: {}", prefix, e);
                false
            }
        }
    }
}
