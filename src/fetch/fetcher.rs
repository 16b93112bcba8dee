// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cache-through page fetching

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::rate_limiter::UpstreamRateLimiter;
use super::transport::PageSource;
use super::types::{FetchError, FetchOptions, PageRequest};
use crate::cache::TtlCache;

/// Shared cache of page bodies and serialized responses
pub type SharedCache = Arc<TtlCache<Arc<str>>>;

/// Page fetcher with optional caching in front of a [`PageSource`]
#[derive(Clone)]
pub struct ContentFetcher {
    source: Arc<dyn PageSource>,
    cache: SharedCache,
    limiter: Arc<UpstreamRateLimiter>,
}

impl ContentFetcher {
    /// Create a new content fetcher
    pub fn new(
        source: Arc<dyn PageSource>,
        cache: SharedCache,
        limiter: Arc<UpstreamRateLimiter>,
    ) -> Self {
        Self {
            source,
            cache,
            limiter,
        }
    }

    /// Cache key for a raw page body
    ///
    /// The key is the exact URL; two different URLs never share an entry.
    pub fn page_key(url: &str) -> String {
        format!("page:{}", url)
    }

    /// Fetch the body of `url`
    ///
    /// With `use_cache` the page cache is checked first and a hit returns
    /// without any network I/O.
    pub async fn fetch(&self, url: &str, options: FetchOptions) -> Result<Arc<str>, FetchError> {
        let key = Self::page_key(url);
        if options.use_cache {
            if let Some(body) = self.cache.get(&key) {
                debug!("Page cache hit for: {}", url);
                return Ok(body);
            }
        }

        if !self.limiter.try_acquire() {
            debug!("Upstream rate limit reached, waiting: {}", url);
            self.limiter.wait().await;
        }

        debug!("Fetching {:?} page via {}: {}", options.class, self.source.name(), url);
        let start = Instant::now();
        let result = self
            .source
            .get(&PageRequest::new(url, options.class))
            .await?;

        info!(
            "Fetched {} bytes from {} in {}ms",
            result.body.len(),
            url,
            start.elapsed().as_millis()
        );

        let body: Arc<str> = Arc::from(result.body);
        if options.use_cache {
            self.cache.set(key, Arc::clone(&body));
        }

        Ok(body)
    }

    /// A fetcher sharing this one's cache and limiter but owning a fresh
    /// transport context, for use inside concurrently running tasks
    pub fn isolated(&self) -> Result<Self, FetchError> {
        Ok(Self {
            source: self.source.isolated()?,
            cache: Arc::clone(&self.cache),
            limiter: Arc::clone(&self.limiter),
        })
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }
}
