//! Authenticated client for the Pixiv ajax API and image host

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::models::{Author, Gallery, GalleryPage};
use super::proxy::upstream_image_url;
use super::{GallerySource, PixivError, Result};
use crate::config::PixivConfig;

/// Pixiv client sharing the process-wide HTTP connection pool
#[derive(Debug, Clone)]
pub struct PixivClient {
    http: Client,
    ajax_base: String,
    image_origin: Url,
    headers: HeaderMap,
    request_timeout: Duration,
}

impl PixivClient {
    pub fn new(http: Client, config: &PixivConfig, session_token: &str) -> Result<Self> {
        let image_origin = Url::parse(&config.image_origin).map_err(|e| {
            PixivError::Configuration(format!("image_origin '{}': {e}", config.image_origin))
        })?;

        Ok(Self {
            http,
            ajax_base: config.ajax_base.trim_end_matches('/').to_string(),
            image_origin,
            headers: authentication_headers(config, session_token)?,
            request_timeout: crate::http::DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Deadline for ajax calls; image streams are only bounded per read
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Starts a streaming GET for an image on the upstream host
    ///
    /// Only the response head has been received when this returns; the body
    /// is left for the caller to consume chunk by chunk. No total deadline is
    /// set, so a slow transfer is not cut off while it keeps making progress.
    pub async fn fetch_image(&self, path: &str) -> Result<reqwest::Response> {
        let url = upstream_image_url(&self.image_origin, path)?;
        debug!(%url, "Proxying pixiv image");

        let response = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: String) -> Result<T> {
        debug!(%endpoint, "Fetching pixiv ajax endpoint");

        let response = self
            .http
            .get(&endpoint)
            .headers(self.headers.clone())
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&bytes).map_err(|e| {
            PixivError::Protocol(format!("HTTP {status} from {endpoint} is not JSON: {e}"))
        })?;

        let body = unwrap_envelope(payload)?;
        serde_json::from_value(body)
            .map_err(|e| PixivError::Protocol(format!("unexpected body from {endpoint}: {e}")))
    }
}

#[async_trait]
impl GallerySource for PixivClient {
    async fn fetch_gallery(&self, id: &str) -> Result<Gallery> {
        self.fetch(format!("{}/illust/{id}", self.ajax_base)).await
    }

    async fn fetch_gallery_pages(&self, id: &str) -> Result<Vec<GalleryPage>> {
        self.fetch(format!("{}/illust/{id}/pages", self.ajax_base)).await
    }

    async fn fetch_user(&self, id: &str) -> Result<Author> {
        self.fetch(format!("{}/user/{id}", self.ajax_base)).await
    }
}

/// Unwraps Pixiv's `{"error": bool, "body": ...}` envelope
///
/// Returns the inner body untouched on success.
pub fn unwrap_envelope(payload: Value) -> Result<Value> {
    let Value::Object(mut envelope) = payload else {
        return Err(PixivError::Protocol("envelope is not an object".to_string()));
    };

    match envelope.get("error").and_then(Value::as_bool) {
        Some(false) => envelope
            .remove("body")
            .ok_or_else(|| PixivError::Protocol("success envelope without body".to_string())),
        Some(true) => {
            let message = envelope
                .get("message")
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
                .unwrap_or("request flagged as failed");
            Err(PixivError::Validation(message.to_string()))
        }
        None => Err(PixivError::Protocol(
            "envelope has no boolean 'error' field".to_string(),
        )),
    }
}

fn authentication_headers(config: &PixivConfig, session_token: &str) -> Result<HeaderMap> {
    let value = |name: &str, raw: String| {
        HeaderValue::from_str(&raw)
            .map_err(|e| PixivError::Configuration(format!("{name} header: {e}")))
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT_LANGUAGE,
        value("Accept-Language", config.accept_language.clone())?,
    );
    headers.insert(
        header::COOKIE,
        value("Cookie", format!("PHPSESSID={session_token}"))?,
    );
    headers.insert(header::REFERER, value("Referer", config.referer.clone())?);
    headers.insert(header::USER_AGENT, value("User-Agent", config.user_agent.clone())?);

    Ok(headers)
}
