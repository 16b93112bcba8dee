// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Records produced by the extraction pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel for a field the page did not provide
pub const UNKNOWN: &str = "N/A";

/// A titled entry on a listing page (home section or search result)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub title: String,
    /// Link with the site origin stripped
    #[serde(rename = "link")]
    pub relative_link: String,
    #[serde(rename = "image")]
    pub image_url: String,
    /// Section-specific fields such as `episodes` or `categories`
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ItemRecord {
    pub fn new(
        title: impl Into<String>,
        relative_link: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            relative_link: relative_link.into(),
            image_url: image_url.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A named grouping of items on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub name: String,
    pub items: Vec<ItemRecord>,
}

/// One episode from a season listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    pub number: String,
    pub title: String,
    #[serde(rename = "url")]
    pub relative_url: String,
    pub image_url: String,
}

/// Season selector found on a detail page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeasonRef {
    pub post_id: String,
    pub season: String,
}

/// Everything the detail page itself yields before the season fan-out
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailPage {
    pub title: String,
    pub image_url: String,
    pub languages: Vec<String>,
    /// Season buttons present on the page, usable or not
    pub season_buttons: usize,
    /// Buttons carrying both a post id and a season number, in page order
    pub seasons: Vec<SeasonRef>,
}
