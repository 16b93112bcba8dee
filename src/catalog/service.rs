// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Catalog service orchestration
//!
//! Composes the fetcher, the two worker pools and the extractor into the
//! home, search, detail and stream operations. Finished responses are kept in
//! the shared cache as JSON until their TTL runs out.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use super::types::{AnimeDetail, CatalogError, HomeResponse, SearchResponse, StreamResult};
use crate::aggregate::Aggregator;
use crate::cache::TtlCache;
use crate::config::RelayConfig;
use crate::extract::{
    classify, find_iframe_urls, find_script_urls, AnimeSaltLayout, RegexUrlScanner,
    SiteExtractor, SiteOrigin, UrlScanner,
};
use crate::fetch::{
    CallClass, ContentFetcher, FetchError, FetchOptions, HttpPageSource, PageSource, SharedCache,
    Timeouts, UpstreamRateLimiter,
};

/// Longest accepted search query, in characters
pub const MAX_QUERY_LEN: usize = 200;

const HOME_KEY: &str = "home";

/// Main catalog service
pub struct CatalogService {
    fetcher: ContentFetcher,
    extractor: Arc<dyn SiteExtractor>,
    scanner: Arc<dyn UrlScanner>,
    origin: SiteOrigin,
    seasons: Aggregator,
    scripts: Aggregator,
    max_script_scans: usize,
}

impl CatalogService {
    /// Create a new catalog service
    ///
    /// # Arguments
    /// * `config` - Origin, worker pool sizes and upstream rate
    /// * `source` - Transport used for every upstream request
    /// * `extractor` - Markup rules of the upstream site
    /// * `cache` - Store for page bodies and finished responses
    pub fn new(
        config: &RelayConfig,
        source: Arc<dyn PageSource>,
        extractor: Arc<dyn SiteExtractor>,
        cache: SharedCache,
    ) -> Result<Self, CatalogError> {
        let origin =
            SiteOrigin::parse(&config.origin).map_err(|e| CatalogError::Config(e.to_string()))?;
        let scanner = RegexUrlScanner::new().map_err(|e| CatalogError::Config(e.to_string()))?;
        let limiter = Arc::new(UpstreamRateLimiter::new(config.upstream_rate_per_minute));

        debug!(
            "Catalog service for {} via {} ({} season workers, {} script workers)",
            origin.as_str(),
            extractor.name(),
            config.season_workers,
            config.script_workers
        );

        Ok(Self {
            fetcher: ContentFetcher::new(source, cache, limiter),
            extractor,
            scanner: Arc::new(scanner),
            origin,
            seasons: Aggregator::new("season", config.season_workers),
            scripts: Aggregator::new("script", config.script_workers),
            max_script_scans: config.max_script_scans,
        })
    }

    /// Create a service talking to the real site over HTTP
    pub fn from_config(config: &RelayConfig) -> Result<Self, CatalogError> {
        let source = HttpPageSource::new(&config.user_agent, Timeouts::from_config(config))
            .map_err(|e| CatalogError::Config(e.to_string()))?;
        debug!("HTTP page source timeouts: {:?}", source.timeouts());
        let origin =
            SiteOrigin::parse(&config.origin).map_err(|e| CatalogError::Config(e.to_string()))?;
        let cache = Arc::new(TtlCache::new(config.cache_ttl()));

        Self::new(
            config,
            Arc::new(source),
            Arc::new(AnimeSaltLayout::new(origin)),
            cache,
        )
    }

    /// Replace the stream URL scanner
    pub fn with_scanner(mut self, scanner: Arc<dyn UrlScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn origin(&self) -> &SiteOrigin {
        &self.origin
    }

    /// Home page sections
    pub async fn home(&self) -> Result<HomeResponse, CatalogError> {
        if let Some(home) = self.cached(HOME_KEY) {
            return Ok(home);
        }

        let start = Instant::now();
        let url = self.origin.absolute("/");
        let html = self
            .fetcher
            .fetch(&url, FetchOptions::cached(CallClass::Page))
            .await?;

        let home = HomeResponse {
            sections: self.extractor.home_sections(&html),
        };

        info!(
            "Home extracted: {} sections in {}ms",
            home.sections.len(),
            start.elapsed().as_millis()
        );

        self.remember(HOME_KEY, &home)?;
        Ok(home)
    }

    /// Search the site
    ///
    /// The query is trimmed; an empty or overlong query is rejected before
    /// any upstream request.
    pub async fn search(&self, query: &str) -> Result<SearchResponse, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::InvalidQuery(
                "Search query is required".to_string(),
            ));
        }
        if query.chars().count() > MAX_QUERY_LEN {
            return Err(CatalogError::InvalidQuery(format!(
                "Search query exceeds {} characters",
                MAX_QUERY_LEN
            )));
        }

        let key = format!("search:{}", query);
        if let Some(response) = self.cached(&key) {
            return Ok(response);
        }

        let url = self.extractor.search_url(query)?;
        let html = self
            .fetcher
            .fetch(&url, FetchOptions::cached(CallClass::Page))
            .await?;

        let results = self.extractor.search_results(&html);
        let response = SearchResponse {
            count: results.len(),
            results,
        };

        info!("Search '{}': {} results", query, response.count);

        self.remember(&key, &response)?;
        Ok(response)
    }

    /// Title details with the episodes of every season
    ///
    /// Seasons are fetched concurrently, each on its own session, and merged
    /// in the order their buttons appear on the page. A season that fails to
    /// load contributes no episodes.
    pub async fn detail(&self, path: &str) -> Result<AnimeDetail, CatalogError> {
        let url = self.origin.site_url(path)?;
        let key = format!("detail:{}", path);
        if let Some(detail) = self.cached(&key) {
            return Ok(detail);
        }

        let start = Instant::now();
        let html = self
            .fetcher
            .fetch(url.as_str(), FetchOptions::cached(CallClass::Detail))
            .await?;

        let page = self.extractor.detail_page(&html);
        if page.season_buttons == 0 {
            return Err(CatalogError::NotFound("No season buttons found".to_string()));
        }

        let season_urls = page
            .seasons
            .iter()
            .map(|season| self.extractor.season_url(season))
            .collect::<Result<Vec<_>, FetchError>>()?;

        let fetcher = self.fetcher.clone();
        let fragments = self
            .seasons
            .run(season_urls, move |season_url| {
                let fetcher = fetcher.clone();
                async move {
                    let worker = fetcher.isolated()?;
                    let body = worker
                        .fetch(&season_url, FetchOptions::uncached(CallClass::Season))
                        .await?;
                    Ok::<_, FetchError>(body.to_string())
                }
            })
            .await;

        let episodes: Vec<_> = fragments
            .iter()
            .flat_map(|fragment| self.extractor.season_episodes(fragment))
            .collect();

        let detail = AnimeDetail {
            title: page.title,
            url: path.to_string(),
            image_url: page.image_url,
            languages: page.languages,
            total_episodes: episodes.len(),
            episodes,
        };

        info!(
            "Detail '{}': {} seasons, {} episodes in {}ms",
            path,
            page.seasons.len(),
            detail.total_episodes,
            start.elapsed().as_millis()
        );

        self.remember(&key, &detail)?;
        Ok(detail)
    }

    /// Stream links for an episode or movie
    ///
    /// The player page is always fetched fresh. Its own text and the first
    /// few scripts it references are scanned for stream URLs.
    pub async fn stream(&self, path: &str) -> Result<StreamResult, CatalogError> {
        let key = format!("stream:{}", path);
        if let Some(result) = self.cached(&key) {
            return Ok(result);
        }

        let start = Instant::now();
        let page_url = self.origin.join(&self.extractor.stream_path(path))?;
        let html = self
            .fetcher
            .fetch(page_url.as_str(), FetchOptions::uncached(CallClass::Page))
            .await?;

        let mut candidates = self.scanner.scan(&html, &page_url);
        let iframes = find_iframe_urls(&html, &page_url);

        let mut scripts = find_script_urls(&html, &page_url);
        scripts.truncate(self.max_script_scans);
        debug!("Scanning {} scripts for {}", scripts.len(), page_url);

        let fetcher = self.fetcher.clone();
        let scanner = Arc::clone(&self.scanner);
        let found = self
            .scripts
            .run(scripts, move |script_url| {
                let fetcher = fetcher.clone();
                let scanner = Arc::clone(&scanner);
                async move { scan_script(fetcher, scanner, script_url).await }
            })
            .await;

        for urls in found {
            candidates.extend(urls);
        }

        let classified = classify(candidates, iframes);
        if classified.unclassified > 0 {
            debug!(
                "{} candidate URLs for {} matched no stream kind",
                classified.unclassified, path
            );
        }

        let result = StreamResult {
            requested_path: path.to_string(),
            total_streams: classified.total(),
            m3u8_links: classified.m3u8,
            video_links: classified.video,
            iframes: classified.iframes,
        };

        info!(
            "Stream '{}': {} links in {}ms",
            path,
            result.total_streams,
            start.elapsed().as_millis()
        );

        self.remember(&key, &result)?;
        Ok(result)
    }

    /// Drop every cached page and response
    pub fn clear_cache(&self) {
        let dropped = self.fetcher.cache().len();
        self.fetcher.cache().clear();
        info!("Cache cleared ({} entries)", dropped);
    }

    /// Number of cache entries, including stale ones not yet purged
    pub fn cache_size(&self) -> usize {
        self.fetcher.cache().len()
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = self.fetcher.cache().get(key)?;
        match serde_json::from_str(&json) {
            Ok(value) => {
                debug!("Response cache hit for: {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn remember<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CatalogError> {
        let json = serde_json::to_string(value)?;
        self.fetcher.cache().set(key, Arc::from(json));
        Ok(())
    }
}

async fn scan_script(
    fetcher: ContentFetcher,
    scanner: Arc<dyn UrlScanner>,
    script_url: String,
) -> Result<BTreeSet<String>, FetchError> {
    // matches inside a script are relative to the script, not the page
    let base = Url::parse(&script_url)
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", script_url, e)))?;
    let worker = fetcher.isolated()?;
    let source = worker
        .fetch(&script_url, FetchOptions::uncached(CallClass::Script))
        .await?;
    Ok(scanner.scan(&source, &base))
}
