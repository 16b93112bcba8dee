// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Origin-relative link handling

use url::Url;

use crate::fetch::FetchError;

/// The upstream site origin links are rebased against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOrigin {
    base: Url,
    prefix: String,
}

impl SiteOrigin {
    pub fn parse(origin: &str) -> Result<Self, FetchError> {
        let base = Url::parse(origin).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", origin, e)))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(origin.to_string()));
        }
        let prefix = origin.trim_end_matches('/').to_string();
        Ok(Self { base, prefix })
    }

    /// Origin without a trailing slash, e.g. `https://animesalt.cc`
    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    pub fn url(&self) -> &Url {
        &self.base
    }

    /// Drop the origin prefix from a link so callers never see the upstream host
    ///
    /// Links on other hosts and already-relative links come back unchanged.
    pub fn strip(&self, link: &str) -> String {
        match link.strip_prefix(&self.prefix) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with(&['/', '?', '#'][..]) => rest.to_string(),
            _ => link.to_string(),
        }
    }

    /// Make a site path absolute; absolute URLs are returned unchanged
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.prefix, path)
        } else {
            format!("{}/{}", self.prefix, path)
        }
    }

    /// Parse `path` as an absolute URL on this site
    pub fn join(&self, path: &str) -> Result<Url, FetchError> {
        let absolute = self.absolute(path);
        Url::parse(&absolute).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", absolute, e)))
    }

    /// Parse a caller-supplied path as a URL on this site
    ///
    /// Anything carrying its own scheme or authority is refused, so the
    /// result always points at the configured origin.
    pub fn site_url(&self, path: &str) -> Result<Url, FetchError> {
        let path = path.trim();
        let foreign = || FetchError::InvalidUrl(format!("{} is not a path on {}", path, self.prefix));
        if path.starts_with("//") || path.starts_with("\\\\") || Url::parse(path).is_ok() {
            return Err(foreign());
        }

        let url = self.join(&format!("/{}", path.trim_start_matches('/')))?;
        if url.origin() != self.base.origin() {
            return Err(foreign());
        }
        Ok(url)
    }
}

/// Resolve `reference` against the page it was found on
///
/// Handles absolute, protocol-relative, root-relative and relative forms.
pub fn resolve(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    base.join(reference).ok().map(String::from)
}

/// Upgrade protocol-relative image URLs (`//cdn/x.jpg`) to https
pub fn upgrade_protocol_relative(link: &str) -> String {
    if link.starts_with("//") {
        format!("https:{}", link)
    } else {
        link.to_string()
    }
}

/// Lower-cased extension of the URL's last path segment, if any
pub fn path_extension(link: &str) -> Option<String> {
    let path = match Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(_) => link.split(&['?', '#'][..]).next().unwrap_or_default().to_string(),
    };
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
