//! Delivery pipeline for a single interaction
//!
//! extract ids → fetch galleries concurrently → build embeds in input order →
//! find-or-create webhook → post → delete the deferred placeholder.

use futures_util::{StreamExt, TryStreamExt, stream};
use std::sync::Arc;
use tracing::{debug, info};

use super::{DeliveryError, DeliveryJob};
use crate::discord::{DeliveryApi, Embed, WebhookMessage, resolve_webhook};
use crate::pixiv::{self, GallerySource, ProxyUrls, build_embed, extract_gallery_ids};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub embeds: usize,
    pub webhook_id: String,
}

pub struct Deliverer {
    gallery: Arc<dyn GallerySource>,
    discord: Arc<dyn DeliveryApi>,
    proxy: ProxyUrls,
    webhook_name: String,
    fetch_concurrency: usize,
}

impl Deliverer {
    pub fn new(
        gallery: Arc<dyn GallerySource>,
        discord: Arc<dyn DeliveryApi>,
        proxy: ProxyUrls,
        webhook_name: impl Into<String>,
        fetch_concurrency: usize,
    ) -> Self {
        Self {
            gallery,
            discord,
            proxy,
            webhook_name: webhook_name.into(),
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// Runs the whole pipeline; the first failing step aborts the job
    ///
    /// No partial message is posted when a gallery fails, and the placeholder
    /// is only deleted after a successful post.
    pub async fn deliver(&self, job: DeliveryJob) -> Result<DeliveryReport, DeliveryError> {
        let ids = extract_gallery_ids(&job.arguments);
        info!(galleries = ids.len(), "Starting delivery");

        let embeds = self.collect_embeds(ids).await?;

        let webhook = resolve_webhook(
            self.discord.as_ref(),
            &job.application_id,
            &job.channel_id,
            &self.webhook_name,
        )
        .await?;

        let message = WebhookMessage {
            avatar_url: job.sender.avatar_url,
            username: job.sender.name,
            embeds,
        };
        self.discord.execute_webhook(&webhook, &message).await?;

        self.discord
            .delete_original_response(&job.application_id, &job.token)
            .await?;

        Ok(DeliveryReport {
            embeds: message.embeds.len(),
            webhook_id: webhook.id,
        })
    }

    /// Embeds in the order of `ids`, whatever order the fetches finish in
    ///
    /// Fetches run as futures polled by this task, so returning early on the
    /// first error drops the ones still pending.
    async fn collect_embeds(&self, ids: Vec<String>) -> Result<Vec<Embed>, DeliveryError> {
        stream::iter(ids)
            .map(|id| async move {
                let result = gallery_embed(self.gallery.as_ref(), &self.proxy, &id).await;
                result.map_err(|source| DeliveryError::Gallery { id, source })
            })
            .buffered(self.fetch_concurrency)
            .try_collect()
            .await
    }
}

/// Gallery Client followed by Embed Builder for one identifier
pub async fn gallery_embed(
    source: &dyn GallerySource,
    proxy: &ProxyUrls,
    id: &str,
) -> pixiv::Result<Embed> {
    let gallery = source.fetch_gallery(id).await?;
    let author = source.fetch_user(&gallery.user_id).await?;
    debug!(gallery_id = id, author = %author.name, "Fetched gallery");

    build_embed(&gallery, &author, proxy)
}
