// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod aggregate;
pub mod api;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod version;

pub use aggregate::{AggregateReport, Aggregator};
pub use cache::TtlCache;
pub use catalog::{AnimeDetail, CatalogError, CatalogService, HomeResponse, SearchResponse, StreamResult};
pub use config::RelayConfig;
pub use extract::{AnimeSaltLayout, SiteExtractor, SiteOrigin, UrlScanner};
pub use fetch::{ContentFetcher, FetchError, HttpPageSource, PageSource};
