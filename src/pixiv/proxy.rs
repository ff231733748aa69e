//! Image proxy helpers
//!
//! Pixiv's image host refuses requests without its referrer and session
//! cookie, which Discord's client cannot send. Embeds therefore point at
//! `/pixiv/image/{path}` on this service, and the route re-issues the request
//! upstream with the authentication headers attached.

use axum::http::{HeaderMap, header};
use reqwest::Url;

use super::{PixivError, Result};

/// Route prefix served by the proxy handler
pub const IMAGE_ROUTE_PREFIX: &str = "/pixiv/image/";

/// Rewrites upstream image URLs into this service's proxy URLs
#[derive(Debug, Clone)]
pub struct ProxyUrls {
    public_base: String,
}

impl ProxyUrls {
    pub fn new(public_url: &str) -> Self {
        Self {
            public_base: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Canonical-to-proxied rewrite
    ///
    /// Exactly one leading `/` is stripped from the upstream path so the
    /// proxied URL never contains `image//...`, which breaks Discord embeds.
    pub fn rewrite(&self, canonical: &str) -> Result<String> {
        let url = Url::parse(canonical)
            .map_err(|e| PixivError::Protocol(format!("invalid image url '{canonical}': {e}")))?;

        let path = url.path();
        let path = path.strip_prefix('/').unwrap_or(path);

        Ok(format!("{}{}{}", self.public_base, IMAGE_ROUTE_PREFIX, path))
    }
}

/// Joins a proxied path fragment onto the upstream image origin
///
/// The result must stay on the origin's host; scheme-relative or absolute
/// fragments are rejected.
pub fn upstream_image_url(origin: &Url, path: &str) -> Result<Url> {
    let fragment = path.trim_start_matches('/');
    if fragment.is_empty() {
        return Err(PixivError::InvalidImagePath("empty path".to_string()));
    }

    let url = origin
        .join(fragment)
        .map_err(|e| PixivError::InvalidImagePath(format!("{path}: {e}")))?;

    if url.scheme() != origin.scheme() || url.host_str() != origin.host_str() {
        return Err(PixivError::InvalidImagePath(path.to_string()));
    }

    Ok(url)
}

/// Upstream response headers safe to relay to the caller
pub fn relayable_headers(upstream: &HeaderMap) -> HeaderMap {
    upstream
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn is_hop_by_hop(name: &header::HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}
