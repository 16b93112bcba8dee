// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the anime relay

/// Semantic version number
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-11-02";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "home-sections",
    "search",
    "season-fan-out",
    "stream-discovery",
    "ttl-cache",
    "gzip-deflate",
    "upstream-rate-limit",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Anime Relay {} ({})", VERSION, BUILD_DATE)
}
