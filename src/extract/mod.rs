// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction pipeline
//!
//! Pure functions from page text to records. Nothing in here performs I/O or
//! keeps state between calls.
//!
//! - [`layout`]: site markup rules behind the [`SiteExtractor`] contract
//! - [`streams`]: stream URL scanning, script/iframe discovery, classification
//! - [`urls`]: origin stripping and relative URL resolution

pub mod layout;
pub mod streams;
pub mod types;
pub mod urls;

pub use layout::{AnimeSaltLayout, SiteExtractor};
pub use streams::{
    classify, find_iframe_urls, find_script_urls, Classified, RegexUrlScanner, UrlScanner,
};
pub use types::{DetailPage, EpisodeRecord, ItemRecord, SeasonRef, SectionRecord, UNKNOWN};
pub use urls::{resolve, SiteOrigin};
