// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for upstream page retrieval

use std::time::Duration;
use thiserror::Error;

use crate::config::RelayConfig;

/// Kind of upstream call, used to pick a timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallClass {
    /// Home, search and stream pages
    Page,
    /// The detail page that gates the season fan-out
    Detail,
    /// Per-season episode fragment
    Season,
    /// Linked script resource scanned for stream URLs
    Script,
}

/// Per-class request timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub page: Duration,
    pub detail: Duration,
    pub season: Duration,
    pub script: Duration,
}

impl Timeouts {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            page: Duration::from_secs(config.page_timeout_secs),
            detail: Duration::from_secs(config.detail_timeout_secs),
            season: Duration::from_secs(config.season_timeout_secs),
            script: Duration::from_secs(config.script_timeout_secs),
        }
    }

    pub fn for_class(&self, class: CallClass) -> Duration {
        match class {
            CallClass::Page => self.page,
            CallClass::Detail => self.detail,
            CallClass::Season => self.season,
            CallClass::Script => self.script,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

/// A single upstream GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Absolute URL, query string included
    pub url: String,
    pub class: CallClass,
}

impl PageRequest {
    pub fn new(url: impl Into<String>, class: CallClass) -> Self {
        Self {
            url: url.into(),
            class,
        }
    }
}

/// Content-Encoding declared by an upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
    Deflate,
    Identity,
    Other(String),
}

impl ContentEncoding {
    /// Parse a `Content-Encoding` header value
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "gzip" | "x-gzip" => Self::Gzip,
            "deflate" => Self::Deflate,
            "" | "identity" => Self::Identity,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Decoded upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub url: String,
    pub body: String,
    pub content_encoding: Option<ContentEncoding>,
}

/// Options for a single fetch through [`super::ContentFetcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Check and populate the page cache
    pub use_cache: bool,
    pub class: CallClass,
}

impl FetchOptions {
    pub fn cached(class: CallClass) -> Self {
        Self {
            use_cache: true,
            class,
        }
    }

    pub fn uncached(class: CallClass) -> Self {
        Self {
            use_cache: false,
            class,
        }
    }
}

/// Errors that can occur while retrieving an upstream page
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Request timed out
    #[error("Timeout after {timeout_ms}ms fetching {url}")]
    Timeout { url: String, timeout_ms: u64 },

    /// Upstream answered with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// DNS, connect or transfer failure
    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    /// URL could not be parsed or built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
