// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use anime_relay::{api::start_server, cli::Cli, config::RelayConfig, version};
use clap::Parser;
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.apply(RelayConfig::from_env());
    config.validate().map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    info!("Starting {}", version::get_version_string());
    info!(
        "Upstream {} (cache TTL {}s, {} season / {} script workers)",
        config.origin, config.cache_ttl_secs, config.season_workers, config.script_workers
    );

    start_server(config).await
}
