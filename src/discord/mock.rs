//! In-memory `DeliveryApi` for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::models::{Webhook, WebhookCredentials, WebhookMessage};
use super::{DeliveryApi, DiscordError, Result};

#[derive(Debug, Default)]
struct State {
    application_id: String,
    webhooks: HashMap<String, Vec<Webhook>>,
    created: Vec<String>,
    executed: Vec<(WebhookCredentials, WebhookMessage)>,
    deleted: Vec<(String, String)>,
    fail_listing: bool,
    next_id: u64,
}

/// Records every call; channels start without webhooks
///
/// Webhooks it creates are owned by the application passed to `new`.
#[derive(Debug)]
pub struct MockDeliveryApi {
    state: Mutex<State>,
}

impl MockDeliveryApi {
    pub fn new(application_id: &str) -> Self {
        Self {
            state: Mutex::new(State {
                application_id: application_id.to_string(),
                ..State::default()
            }),
        }
    }

    pub fn add_webhook(&self, channel_id: &str, webhook: Webhook) {
        self.lock()
            .webhooks
            .entry(channel_id.to_string())
            .or_default()
            .push(webhook);
    }

    /// Makes webhook listing answer 403 from now on
    pub fn fail_listing(&self) {
        self.lock().fail_listing = true;
    }

    pub fn created_count(&self) -> usize {
        self.lock().created.len()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.lock().created.clone()
    }

    pub fn executed(&self) -> Vec<(WebhookCredentials, WebhookMessage)> {
        self.lock().executed.clone()
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.lock().deleted.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DeliveryApi for MockDeliveryApi {
    async fn list_channel_webhooks(&self, channel_id: &str) -> Result<Vec<Webhook>> {
        let state = self.lock();
        if state.fail_listing {
            return Err(DiscordError::Status {
                status: 403,
                body: "Missing Permissions".to_string(),
            });
        }
        Ok(state.webhooks.get(channel_id).cloned().unwrap_or_default())
    }

    async fn create_channel_webhook(&self, channel_id: &str, name: &str) -> Result<Webhook> {
        let mut state = self.lock();
        state.next_id += 1;
        let webhook = Webhook {
            id: format!("webhook-{}", state.next_id),
            token: Some(format!("token-{}", state.next_id)),
            application_id: Some(state.application_id.clone()),
        };

        state.created.push(name.to_string());
        state
            .webhooks
            .entry(channel_id.to_string())
            .or_default()
            .push(webhook.clone());

        Ok(webhook)
    }

    async fn execute_webhook(
        &self,
        webhook: &WebhookCredentials,
        message: &WebhookMessage,
    ) -> Result<()> {
        self.lock().executed.push((webhook.clone(), message.clone()));
        Ok(())
    }

    async fn delete_original_response(&self, application_id: &str, token: &str) -> Result<()> {
        self.lock()
            .deleted
            .push((application_id.to_string(), token.to_string()));
        Ok(())
    }
}
