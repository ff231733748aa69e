//! Discord REST side of delivery: webhook discovery, execution and
//! interaction placeholder cleanup.

mod client;
#[cfg(test)]
pub(crate) mod mock;
pub mod models;
pub mod webhooks;

use async_trait::async_trait;
use thiserror::Error;

pub use client::DiscordClient;
pub use models::{Embed, Webhook, WebhookCredentials, WebhookMessage};
pub use webhooks::{find_webhook, resolve_webhook};

#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("discord request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("discord returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected discord response: {0}")]
    Decode(String),

    #[error("invalid discord client configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, DiscordError>;

/// Discord endpoints the delivery worker talks to
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    /// Webhooks registered on a channel (bot-authenticated)
    async fn list_channel_webhooks(&self, channel_id: &str) -> Result<Vec<Webhook>>;

    /// Creates an incoming webhook on a channel (bot-authenticated)
    async fn create_channel_webhook(&self, channel_id: &str, name: &str) -> Result<Webhook>;

    async fn execute_webhook(
        &self,
        webhook: &WebhookCredentials,
        message: &WebhookMessage,
    ) -> Result<()>;

    /// Removes the deferred "thinking" placeholder of an interaction
    async fn delete_original_response(&self, application_id: &str, token: &str) -> Result<()>;
}
