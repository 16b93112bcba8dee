// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;

use crate::config::RelayConfig;

/// Anime Relay
///
/// Every flag falls back to its environment variable, then to the built-in
/// default.
#[derive(Parser, Debug, Default)]
#[command(name = "anime-relay")]
#[command(version)]
#[command(about = "JSON relay for an anime catalog site", long_about = None)]
pub struct Cli {
    /// Upstream site origin
    #[arg(long, env = "RELAY_ORIGIN")]
    pub origin: Option<String>,

    /// Listen host
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Seconds a cached page or response stays valid
    #[arg(long, env = "RELAY_CACHE_TTL_SECS")]
    pub cache_ttl_secs: Option<u64>,

    /// Concurrent season fetches
    #[arg(long, env = "RELAY_SEASON_WORKERS")]
    pub season_workers: Option<usize>,

    /// Concurrent script scans
    #[arg(long, env = "RELAY_SCRIPT_WORKERS")]
    pub script_workers: Option<usize>,

    /// Scripts scanned per stream lookup
    #[arg(long, env = "RELAY_MAX_SCRIPT_SCANS")]
    pub max_script_scans: Option<usize>,

    /// Upstream requests allowed per minute
    #[arg(long, env = "RELAY_UPSTREAM_RATE_PER_MINUTE")]
    pub upstream_rate_per_minute: Option<u32>,
}

impl Cli {
    /// Apply the flags given on the command line on top of `config`
    pub fn apply(self, mut config: RelayConfig) -> RelayConfig {
        if let Some(origin) = self.origin {
            config.origin = origin.trim_end_matches('/').to_string();
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ttl) = self.cache_ttl_secs {
            config.cache_ttl_secs = ttl;
        }
        if let Some(workers) = self.season_workers {
            config.season_workers = workers;
        }
        if let Some(workers) = self.script_workers {
            config.script_workers = workers;
        }
        if let Some(scans) = self.max_script_scans {
            config.max_script_scans = scans;
        }
        if let Some(rate) = self.upstream_rate_per_minute {
            config.upstream_rate_per_minute = rate;
        }
        config
    }
}
