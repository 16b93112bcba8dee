// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Stream URL discovery and classification
//!
//! ```text
//! page HTML ──> UrlScanner ──────────────┐
//!     │                                  ├─> union ─> classify ─> m3u8 / video / iframes
//!     ├──> find_script_urls ─> scan each ┘
//!     └──> find_iframe_urls ─────────────────────────────^
//! ```

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

use super::urls::{path_extension, resolve};

/// Extensions that never point at a stream
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    "js", "css", "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "woff", "woff2",
];

/// Direct media file extensions
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "ts", "mkv", "ogg"];

/// Strategy for pulling candidate stream URLs out of arbitrary text
pub trait UrlScanner: Send + Sync {
    /// Absolute, de-duplicated candidate URLs found in `text`
    ///
    /// Relative matches are resolved against `base`, the URL the text came from.
    fn scan(&self, text: &str, base: &Url) -> BTreeSet<String>;
}

/// Regex-based scanner for manifests and media files
pub struct RegexUrlScanner {
    manifest: Regex,
    media: Regex,
    quoted_relative: Regex,
}

impl RegexUrlScanner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            manifest: Regex::new(r#"(?i)https?://[^\s"'<>`]+\.m3u8[^\s"'<>`]*"#)?,
            media: Regex::new(
                r#"(?i)https?://[^\s"'<>`]+\.(?:mp4|webm|ogg|mov|mkv|ts)\b(?:\?[^\s"'<>`]*)?"#,
            )?,
            quoted_relative: Regex::new(
                r#"(?i)["'](/[^\s"'<>`]+\.(?:m3u8|mp4|webm|ogg|mov|mkv|ts)\b(?:\?[^\s"'<>`]*)?)["']"#,
            )?,
        })
    }
}

impl UrlScanner for RegexUrlScanner {
    fn scan(&self, text: &str, base: &Url) -> BTreeSet<String> {
        let absolute = self
            .manifest
            .find_iter(text)
            .chain(self.media.find_iter(text))
            .map(|m| m.as_str());
        let relative = self
            .quoted_relative
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str());

        absolute
            .chain(relative)
            .filter_map(|candidate| resolve(base, candidate))
            .collect()
    }
}

fn script_src_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)<script[^>]+src\s*=\s*["']([^"']*)["']"#)
            .expect("script src pattern is valid")
    })
}

fn iframe_src_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)<iframe[^>]+src\s*=\s*["']([^"']*)["']"#)
            .expect("iframe src pattern is valid")
    })
}

/// Script sources worth scanning, absolute and in first-seen order
pub fn find_script_urls(html: &str, page_url: &Url) -> Vec<String> {
    let mut seen = BTreeSet::new();
    script_src_pattern()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|src| resolve(page_url, src.as_str()))
        .filter(|url| {
            path_extension(url).as_deref() == Some("js") || url.to_lowercase().contains("javascript")
        })
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Embedded player frames, absolute and de-duplicated
///
/// Only http(s) frames count; placeholders such as `about:blank` are dropped.
pub fn find_iframe_urls(html: &str, page_url: &Url) -> BTreeSet<String> {
    iframe_src_pattern()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|src| resolve(page_url, src.as_str()))
        .filter(|url| url.starts_with("https://") || url.starts_with("http://"))
        .collect()
}

/// Stream URLs split into mutually exclusive buckets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub m3u8: BTreeSet<String>,
    pub video: BTreeSet<String>,
    pub iframes: BTreeSet<String>,
    /// Candidates that were neither excluded nor matched a bucket
    pub unclassified: usize,
}

impl Classified {
    pub fn total(&self) -> usize {
        self.m3u8.len() + self.video.len() + self.iframes.len()
    }
}

/// Filter out asset URLs and partition the rest by kind
///
/// Each URL lands in at most one bucket. Iframe sources that already appear
/// as manifests or media files are not repeated as iframes.
pub fn classify(candidates: BTreeSet<String>, iframes: BTreeSet<String>) -> Classified {
    let mut classified = Classified::default();
    let mut excluded = 0usize;

    for url in candidates {
        let extension = path_extension(&url);
        let extension = extension.as_deref();

        if extension.is_some_and(|ext| EXCLUDED_EXTENSIONS.contains(&ext)) {
            excluded += 1;
        } else if url.to_lowercase().contains(".m3u8") {
            classified.m3u8.insert(url);
        } else if extension.is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext)) {
            classified.video.insert(url);
        } else {
            classified.unclassified += 1;
        }
    }

    classified.iframes = iframes
        .into_iter()
        .filter(|url| !classified.m3u8.contains(url) && !classified.video.contains(url))
        .collect();

    debug!(
        "Classified streams: {} m3u8, {} video, {} iframes, {} excluded, {} unclassified",
        classified.m3u8.len(),
        classified.video.len(),
        classified.iframes.len(),
        excluded,
        classified.unclassified
    );

    classified
}
