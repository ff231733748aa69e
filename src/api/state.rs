use std::sync::Arc;

use super::signature::SignatureVerifier;
use crate::config::Config;
use crate::observability::Metrics;
use crate::pixiv::PixivClient;
use crate::worker::DeliveryQueue;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pixiv: Arc<PixivClient>,
    pub verifier: Arc<SignatureVerifier>,
    pub queue: DeliveryQueue,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        pixiv: Arc<PixivClient>,
        verifier: SignatureVerifier,
        queue: DeliveryQueue,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            config,
            pixiv,
            verifier: Arc::new(verifier),
            queue,
            metrics,
        }
    }
}
