//! Pixiv integration: authenticated ajax client, link extraction, embed
//! assembly and the image proxy helpers.

mod client;
pub mod embed;
pub mod links;
#[cfg(test)]
pub(crate) mod mock;
pub mod models;
pub mod proxy;

use async_trait::async_trait;
use thiserror::Error;

pub use client::{PixivClient, unwrap_envelope};
pub use embed::build_embed;
pub use links::extract_gallery_ids;
pub use models::{Author, Gallery, GalleryPage};
pub use proxy::ProxyUrls;

#[derive(Debug, Error)]
pub enum PixivError {
    /// Upstream explicitly flagged the request as failed (private, deleted, ...)
    #[error("pixiv rejected the request: {0}")]
    Validation(String),

    /// Upstream answered with a shape we do not recognise
    #[error("unexpected pixiv response: {0}")]
    Protocol(String),

    #[error("pixiv request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid image path: {0}")]
    InvalidImagePath(String),

    #[error("invalid pixiv client configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, PixivError>;

/// Read access to gallery and author metadata
#[async_trait]
pub trait GallerySource: Send + Sync {
    async fn fetch_gallery(&self, id: &str) -> Result<Gallery>;

    async fn fetch_gallery_pages(&self, id: &str) -> Result<Vec<GalleryPage>>;

    async fn fetch_user(&self, id: &str) -> Result<Author>;
}
