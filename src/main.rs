//! config-seed - Consul configuration seeder
//!
//! Populates a Consul key/value store from local configuration files at
//! service bootstrap.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config_seed::cli::Cli;
use config_seed::seed::SeedOutcome;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.debug);

    info!("Starting config-seed");

    match cli.execute().await {
        Ok(SeedOutcome::AlreadyInitialized) => {
            info!("Consul already holds configuration data; nothing to do");
        }
        Ok(SeedOutcome::Seeded { report, reset }) => {
            info!(
                "Seeding finished: {} file(s), {} key(s){}",
                report.files,
                report.keys,
                if reset { " after reset" } else { "" }
            );
        }
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug {
        "config_seed=debug"
    } else {
        "config_seed=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
