// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upstream content fetching
//!
//! ## Architecture
//!
//! ```text
//! ContentFetcher ──(miss)──> UpstreamRateLimiter ──> PageSource ──> reqwest
//!        │                                              │
//!        └──(hit)── TtlCache "page:<url>"      gzip/deflate inflate + lossy UTF-8
//! ```
//!
//! Fan-out tasks call [`ContentFetcher::isolated`] so that concurrently
//! running requests never share a connection pool.

pub mod fetcher;
pub mod rate_limiter;
pub mod transport;
pub mod types;

pub use fetcher::{ContentFetcher, SharedCache};
pub use rate_limiter::UpstreamRateLimiter;
pub use transport::{decode_body, HttpPageSource, PageSource};
pub use types::{
    CallClass, ContentEncoding, FetchError, FetchOptions, FetchResult, PageRequest, Timeouts,
};
