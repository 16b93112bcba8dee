// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upstream transport
//!
//! `PageSource` is the seam between the fetcher and the network. The reqwest
//! implementation keeps one connection pool per instance; `isolated()` hands
//! out a brand new one for concurrently running fan-out tasks.

use async_trait::async_trait;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::io::Read;
use std::sync::Arc;
use tracing::warn;

use super::types::{ContentEncoding, FetchError, FetchResult, PageRequest, Timeouts};

/// Trait for anything that can answer an upstream GET
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Perform the request and return the decoded body
    async fn get(&self, request: &PageRequest) -> Result<FetchResult, FetchError>;

    /// A source with its own transport context (connections, cookies)
    fn isolated(&self) -> Result<Arc<dyn PageSource>, FetchError>;

    /// Name for logging
    fn name(&self) -> &'static str;
}

/// reqwest-backed page source
pub struct HttpPageSource {
    client: Client,
    user_agent: String,
    timeouts: Timeouts,
}

impl HttpPageSource {
    /// Create a new source with its own connection pool
    pub fn new(user_agent: &str, timeouts: Timeouts) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(default_headers())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            timeouts,
        })
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn get(&self, request: &PageRequest) -> Result<FetchResult, FetchError> {
        let timeout = self.timeouts.for_class(request.class);
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: request.url.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                }
            } else {
                FetchError::Connection {
                    url: request.url.clone(),
                    message: e.to_string(),
                }
            }
        };

        let response = self
            .client
            .get(&request.url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: request.url.clone(),
            });
        }

        let content_encoding = response
            .headers()
            .get(reqwest::header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(ContentEncoding::from_header);

        let bytes = response.bytes().await.map_err(map_err)?;

        Ok(FetchResult {
            url: request.url.clone(),
            body: decode_body(&bytes, content_encoding.as_ref()),
            content_encoding,
        })
    }

    fn isolated(&self) -> Result<Arc<dyn PageSource>, FetchError> {
        Ok(Arc::new(Self::new(&self.user_agent, self.timeouts)?))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    headers
}

/// Turn raw response bytes into text
///
/// Compressed bodies are inflated first. Bytes that are not valid UTF-8 are
/// replaced rather than rejected, and a body that fails to inflate is decoded
/// as-is.
pub fn decode_body(bytes: &[u8], encoding: Option<&ContentEncoding>) -> String {
    let inflated = match encoding {
        Some(ContentEncoding::Gzip) => inflate(GzDecoder::new(bytes)),
        Some(ContentEncoding::Deflate) => {
            inflate(ZlibDecoder::new(bytes)).or_else(|_| inflate(DeflateDecoder::new(bytes)))
        }
        Some(ContentEncoding::Other(name)) => {
            warn!("Unsupported content encoding {}, decoding raw bytes", name);
            return String::from_utf8_lossy(bytes).into_owned();
        }
        Some(ContentEncoding::Identity) | None => {
            return String::from_utf8_lossy(bytes).into_owned();
        }
    };

    match inflated {
        Ok(raw) => String::from_utf8_lossy(&raw).into_owned(),
        Err(e) => {
            warn!("Failed to inflate {:?} body ({}), decoding raw bytes", encoding, e);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

fn inflate(mut decoder: impl Read) -> std::io::Result<Vec<u8>> {
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;
    Ok(raw)
}
