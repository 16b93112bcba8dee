// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Unix time in seconds
    pub timestamp: f64,
    pub cache_size: usize,
    /// Seconds since the server state was built
    pub uptime: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub method: String,
    pub path: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub name: String,
    pub version: String,
    pub origin: String,
    pub features: Vec<String>,
    pub endpoints: Vec<EndpointInfo>,
}

impl IndexResponse {
    pub fn new(origin: &str) -> Self {
        let endpoints = [
            ("GET", "/home", "Home page sections"),
            ("GET", "/search?q=<term>", "Search titles"),
            ("GET", "/detail/<path>", "Title details with every episode"),
            ("GET", "/stream/<path>", "Stream links of an episode or movie"),
            ("POST", "/cache/clear", "Drop every cached page and response"),
            ("GET", "/health", "Service health"),
        ]
        .iter()
        .map(|(method, path, description)| EndpointInfo {
            method: method.to_string(),
            path: path.to_string(),
            description: description.to_string(),
        })
        .collect();

        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: crate::version::VERSION.to_string(),
            origin: origin.to_string(),
            features: crate::version::FEATURES.iter().map(|f| f.to_string()).collect(),
            endpoints,
        }
    }
}
