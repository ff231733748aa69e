//! Webhook resolution
//!
//! Nothing is cached: every delivery lists the channel's webhooks again.
//! Find-then-create is not atomic, so two first-time deliveries racing on the
//! same channel can each create a webhook. Either one works for posting.

use tracing::info;

use super::models::WebhookCredentials;
use super::{DeliveryApi, DiscordError, Result};

/// First executable webhook on `channel_id` owned by `application_id`
pub async fn find_webhook<A>(
    api: &A,
    application_id: &str,
    channel_id: &str,
) -> Result<Option<WebhookCredentials>>
where
    A: DeliveryApi + ?Sized,
{
    let webhooks = api.list_channel_webhooks(channel_id).await?;

    Ok(webhooks
        .iter()
        .filter(|webhook| webhook.application_id.as_deref() == Some(application_id))
        .find_map(|webhook| webhook.credentials()))
}

/// Find-or-create
pub async fn resolve_webhook<A>(
    api: &A,
    application_id: &str,
    channel_id: &str,
    name: &str,
) -> Result<WebhookCredentials>
where
    A: DeliveryApi + ?Sized,
{
    if let Some(existing) = find_webhook(api, application_id, channel_id).await? {
        return Ok(existing);
    }

    let created = api.create_channel_webhook(channel_id, name).await?;
    info!(channel_id, webhook_id = %created.id, "Created delivery webhook");

    created
        .credentials()
        .ok_or_else(|| DiscordError::Decode("created webhook carries no token".to_string()))
}
