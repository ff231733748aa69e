//! Discord REST client

use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{CreateWebhook, Webhook, WebhookCredentials, WebhookMessage};
use super::{DeliveryApi, DiscordError, Result};

#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: Client,
    api_base: String,
    bot_authorization: HeaderValue,
    request_timeout: Duration,
}

impl DiscordClient {
    pub fn new(http: Client, api_base: &str, bot_token: &str) -> Result<Self> {
        let mut bot_authorization = HeaderValue::from_str(&format!("Bot {bot_token}"))
            .map_err(|e| DiscordError::Configuration(format!("bot token: {e}")))?;
        bot_authorization.set_sensitive(true);

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_authorization,
            request_timeout: crate::http::DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn channel_webhooks_endpoint(&self, channel_id: &str) -> String {
        format!("{}/channels/{channel_id}/webhooks", self.api_base)
    }

    fn webhook_endpoint(&self, webhook: &WebhookCredentials) -> String {
        format!("{}/webhooks/{}/{}", self.api_base, webhook.id, webhook.token)
    }

    fn original_response_endpoint(&self, application_id: &str, token: &str) -> String {
        format!(
            "{}/webhooks/{application_id}/{token}/messages/@original",
            self.api_base
        )
    }
}

/// Turns non-2xx responses into `DiscordError::Status`
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), body = %body, "Discord API request failed");

    Err(DiscordError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl DeliveryApi for DiscordClient {
    async fn list_channel_webhooks(&self, channel_id: &str) -> Result<Vec<Webhook>> {
        debug!(channel_id, "Listing channel webhooks");

        let response = self
            .http
            .get(self.channel_webhooks_endpoint(channel_id))
            .header(header::AUTHORIZATION, self.bot_authorization.clone())
            .timeout(self.request_timeout)
            .send()
            .await?;

        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| DiscordError::Decode(format!("webhook list: {e}")))
    }

    async fn create_channel_webhook(&self, channel_id: &str, name: &str) -> Result<Webhook> {
        debug!(channel_id, name, "Creating channel webhook");

        let response = self
            .http
            .post(self.channel_webhooks_endpoint(channel_id))
            .header(header::AUTHORIZATION, self.bot_authorization.clone())
            .json(&CreateWebhook { name })
            .timeout(self.request_timeout)
            .send()
            .await?;

        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| DiscordError::Decode(format!("created webhook: {e}")))
    }

    async fn execute_webhook(
        &self,
        webhook: &WebhookCredentials,
        message: &WebhookMessage,
    ) -> Result<()> {
        debug!(
            webhook_id = %webhook.id,
            embeds = message.embeds.len(),
            "Executing webhook"
        );

        let response = self
            .http
            .post(self.webhook_endpoint(webhook))
            .json(message)
            .timeout(self.request_timeout)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_original_response(&self, application_id: &str, token: &str) -> Result<()> {
        debug!(application_id, "Deleting deferred interaction response");

        let response = self
            .http
            .delete(self.original_response_endpoint(application_id, token))
            .timeout(self.request_timeout)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}
