//! Discord REST payloads used by the delivery path

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Channel webhook as returned by `GET /channels/{id}/webhooks`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Webhook {
    pub id: String,
    /// Only present for incoming webhooks the caller may execute
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
}

impl Webhook {
    /// Id and token pair, when this webhook can be executed
    pub fn credentials(&self) -> Option<WebhookCredentials> {
        self.token.as_ref().map(|token| WebhookCredentials {
            id: self.id.clone(),
            token: token.clone(),
        })
    }
}

/// What is needed to post through a webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookCredentials {
    pub id: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct CreateWebhook<'a> {
    pub name: &'a str,
}

/// Body of an execute-webhook call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookMessage {
    pub avatar_url: Option<String>,
    pub username: Option<String>,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub description: String,
    pub color: u32,
    pub timestamp: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
    pub author: EmbedAuthor,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: String,
}
