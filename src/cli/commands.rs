//! CLI arguments and command execution
//!
//! This module defines the command-line interface using clap and wires the
//! resolved configuration, the Consul client and the seeder together.

use crate::config::{load_config, LoadOptions, SeedConfig};
use crate::error::Result;
use crate::seed::{SeedOutcome, Seeder};
use crate::store::{connect, ConsulClient};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "config-seed")]
#[command(about = "Seed a Consul key/value store from local configuration files")]
#[command(version, author)]
pub struct Cli {
    /// Apply CONSUL_* connection settings from the environment
    #[arg(short = 'c', long)]
    pub consul: bool,

    /// Configuration profile (reads <confdir>/<profile>/configuration.toml)
    #[arg(short = 'p', long, env = "CONFIG_SEED_PROFILE")]
    pub profile: Option<String>,

    /// Directory holding configuration.toml and banner.txt
    #[arg(long, default_value = "./res")]
    pub confdir: PathBuf,

    /// Explicit configuration file, overrides --confdir and --profile
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Delete everything under the global prefix before importing
    #[arg(long)]
    pub reset: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Do not print the banner
    #[arg(long)]
    pub no_banner: bool,
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            path: SeedConfig::resolve_path(
                &self.confdir,
                self.profile.as_deref(),
                self.file.as_deref(),
            ),
            use_consul_env: self.consul,
            force_reset: self.reset,
        }
    }

    pub async fn execute(&self) -> Result<SeedOutcome> {
        let options = self.load_options();
        info!("loading configuration from {}", options.path.display());
        let config = load_config(&options).await?;

        let client = ConsulClient::from_config(&config)?;
        info!("checking Consul at {}", client.base_url());
        let client = connect(client, &config.retry_options()).await?;

        let outcome = Seeder::new(config, client).run().await?;

        if !self.no_banner {
            print_banner(&self.confdir.join("banner.txt")).await;
        }

        Ok(outcome)
    }
}

async fn print_banner(path: &Path) {
    match tokio::fs::read_to_string(path).await {
        Ok(banner) => println!("{}", banner),
        Err(e) => debug!("no banner at {}: {}", path.display(), e),
    }
}
