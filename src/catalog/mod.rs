// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Catalog operations
//!
//! ## Architecture
//!
//! ```text
//! CatalogService
//!   ├── home    ─> fetch (cached) ─> SiteExtractor::home_sections
//!   ├── search  ─> fetch (cached) ─> SiteExtractor::search_results
//!   ├── detail  ─> fetch (cached) ─> detail_page ─> season Aggregator ─> season_episodes
//!   └── stream  ─> fetch (fresh)  ─> UrlScanner + script Aggregator ─> classify
//!
//! every finished response ─> TtlCache "home" | "search:<q>" | "detail:<path>" | "stream:<path>"
//! ```

pub mod service;
pub mod types;

pub use service::{CatalogService, MAX_QUERY_LEN};
pub use types::{AnimeDetail, CatalogError, HomeResponse, SearchResponse, StreamResult};
