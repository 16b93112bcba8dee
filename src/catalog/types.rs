// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Response types produced by the catalog service

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::extract::{EpisodeRecord, ItemRecord, SectionRecord};
use crate::fetch::FetchError;

/// Home page sections, serialized as an object keyed by section name in page order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeResponse {
    pub sections: Vec<SectionRecord>,
}

impl HomeResponse {
    pub fn section(&self, name: &str) -> Option<&SectionRecord> {
        self.sections.iter().find(|section| section.name == name)
    }
}

impl Serialize for HomeResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.name, &section.items)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HomeResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionsVisitor;

        impl<'de> Visitor<'de> for SectionsVisitor {
            type Value = HomeResponse;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of section name to items")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut sections = Vec::new();
                while let Some((name, items)) = access.next_entry::<String, Vec<ItemRecord>>()? {
                    sections.push(SectionRecord { name, items });
                }
                Ok(HomeResponse { sections })
            }
        }

        deserializer.deserialize_map(SectionsVisitor)
    }
}

/// Search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<ItemRecord>,
    pub count: usize,
}

/// Detail of one title, episodes of every season merged in season order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetail {
    pub title: String,
    /// The requested path, relative to the site origin
    pub url: String,
    pub image_url: String,
    pub languages: Vec<String>,
    pub total_episodes: usize,
    pub episodes: Vec<EpisodeRecord>,
}

/// Stream links found for an episode or movie page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResult {
    pub requested_path: String,
    pub m3u8_links: BTreeSet<String>,
    pub video_links: BTreeSet<String>,
    pub iframes: BTreeSet<String>,
    /// Sum of the three link sets
    pub total_streams: usize,
}

/// Errors that can occur while serving a catalog request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Upstream retrieval failed
    #[error("Upstream error: {0}")]
    Network(#[from] FetchError),

    /// The page lacks the minimum structure needed for a response
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request parameters were rejected
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A response could not be written to or read from the cache
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The service could not be assembled
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
