// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the relay service

use std::env;
use std::time::Duration;

pub const DEFAULT_ORIGIN: &str = "https://animesalt.cc";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the relay service
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Upstream site origin, e.g. `https://animesalt.cc`
    pub origin: String,
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_secs: u64,
    /// Concurrent season fetches (default: 5)
    pub season_workers: usize,
    /// Concurrent script scans (default: 5)
    pub script_workers: usize,
    /// Scripts scanned per stream lookup (default: 5)
    pub max_script_scans: usize,
    /// Timeout for ordinary page fetches in seconds (default: 10)
    pub page_timeout_secs: u64,
    /// Timeout for script fetches in seconds (default: 5)
    pub script_timeout_secs: u64,
    /// Timeout for the detail page fetch in seconds (default: 15)
    pub detail_timeout_secs: u64,
    /// Timeout for per-season episode fetches in seconds (default: 15)
    pub season_timeout_secs: u64,
    /// Upstream requests allowed per minute (default: 600)
    pub upstream_rate_per_minute: u32,
    /// User agent sent upstream
    pub user_agent: String,
    /// Listen host (default: 0.0.0.0)
    pub host: String,
    /// Listen port (default: 5000)
    pub port: u16,
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            origin: env::var("RELAY_ORIGIN")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.origin),
            cache_ttl_secs: parse_env("RELAY_CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl_secs),
            season_workers: parse_env("RELAY_SEASON_WORKERS").unwrap_or(defaults.season_workers),
            script_workers: parse_env("RELAY_SCRIPT_WORKERS").unwrap_or(defaults.script_workers),
            max_script_scans: parse_env("RELAY_MAX_SCRIPT_SCANS")
                .unwrap_or(defaults.max_script_scans),
            page_timeout_secs: parse_env("RELAY_PAGE_TIMEOUT_SECS")
                .unwrap_or(defaults.page_timeout_secs),
            script_timeout_secs: parse_env("RELAY_SCRIPT_TIMEOUT_SECS")
                .unwrap_or(defaults.script_timeout_secs),
            detail_timeout_secs: parse_env("RELAY_DETAIL_TIMEOUT_SECS")
                .unwrap_or(defaults.detail_timeout_secs),
            season_timeout_secs: parse_env("RELAY_SEASON_TIMEOUT_SECS")
                .unwrap_or(defaults.season_timeout_secs),
            upstream_rate_per_minute: parse_env("RELAY_UPSTREAM_RATE_PER_MINUTE")
                .unwrap_or(defaults.upstream_rate_per_minute),
            user_agent: env::var("RELAY_USER_AGENT").unwrap_or(defaults.user_agent),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT").unwrap_or(defaults.port),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        match url::Url::parse(&self.origin) {
            Ok(origin) if ["http", "https"].contains(&origin.scheme()) => {}
            Ok(_) => return Err(format!("origin must be http or https: {}", self.origin)),
            Err(e) => return Err(format!("invalid origin {}: {}", self.origin, e)),
        }
        if self.cache_ttl_secs == 0 {
            return Err("cache_ttl_secs must be greater than 0".to_string());
        }
        if self.season_workers == 0 || self.script_workers == 0 {
            return Err("worker pools need at least 1 worker".to_string());
        }
        if self.page_timeout_secs == 0
            || self.script_timeout_secs == 0
            || self.detail_timeout_secs == 0
            || self.season_timeout_secs == 0
        {
            return Err("timeouts must be at least 1 second".to_string());
        }
        if self.upstream_rate_per_minute == 0 {
            return Err("upstream_rate_per_minute must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            cache_ttl_secs: 300,
            season_workers: 5,
            script_workers: 5,
            max_script_scans: 5,
            page_timeout_secs: 10,
            script_timeout_secs: 5,
            detail_timeout_secs: 15,
            season_timeout_secs: 15,
            upstream_rate_per_minute: 600,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
