//! Background delivery
//!
//! The interaction handler hands a [`DeliveryJob`] to the [`DeliveryQueue`]
//! without waiting. A single supervisor task drains the queue and runs every
//! job on its own task inside a `JoinSet`; failures and panics stop at the
//! join point, where they are logged and counted.

pub mod runner;

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{JoinError, JoinSet};
use tracing::{Instrument, error, info, info_span, warn};

use crate::discord::DiscordError;
use crate::observability::Metrics;
use crate::pixiv::PixivError;

pub use runner::{DeliveryReport, Deliverer};

/// Everything the worker needs from one command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryJob {
    pub application_id: String,
    /// Single-use interaction token
    pub token: String,
    pub channel_id: String,
    pub sender: Sender,
    /// Free-text command argument the gallery links are extracted from
    pub arguments: String,
}

/// Display metadata of the invoking user, reused for the webhook message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("gallery {id}: {source}")]
    Gallery {
        id: String,
        #[source]
        source: PixivError,
    },

    #[error(transparent)]
    Discord(#[from] DiscordError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("delivery queue is full")]
    Full,
    #[error("delivery queue is closed")]
    Closed,
}

/// Sending half of the delivery queue, cloned into the HTTP state
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    sender: mpsc::Sender<DeliveryJob>,
}

impl DeliveryQueue {
    /// Returns the queue and the receiver to hand to [`supervise`]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DeliveryJob>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Never waits; a full queue rejects the job
    pub fn schedule(&self, job: DeliveryJob) -> Result<(), ScheduleError> {
        self.sender.try_send(job).map_err(|e| match e {
            TrySendError::Full(_) => ScheduleError::Full,
            TrySendError::Closed(_) => ScheduleError::Closed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Runs deliveries until every queue sender is dropped, then drains in-flight jobs
pub async fn supervise(
    mut receiver: mpsc::Receiver<DeliveryJob>,
    deliverer: Arc<Deliverer>,
    metrics: Arc<Metrics>,
) {
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            job = receiver.recv() => {
                let Some(job) = job else { break };
                let span = info_span!(
                    "delivery",
                    application_id = %job.application_id,
                    channel_id = %job.channel_id,
                );
                let deliverer = Arc::clone(&deliverer);
                in_flight.spawn(async move { deliverer.deliver(job).await }.instrument(span));
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                record(joined, &metrics);
            }
        }
    }

    if !in_flight.is_empty() {
        info!(pending = in_flight.len(), "Delivery queue closed, draining in-flight jobs");
    }
    while let Some(joined) = in_flight.join_next().await {
        record(joined, &metrics);
    }
}

fn record(joined: Result<Result<DeliveryReport, DeliveryError>, JoinError>, metrics: &Metrics) {
    match joined {
        Ok(Ok(report)) => {
            metrics.delivery_completed();
            info!(
                embeds = report.embeds,
                webhook_id = %report.webhook_id,
                "Delivery completed"
            );
        }
        Ok(Err(e)) => {
            metrics.delivery_failed();
            warn!(error = %e, "Delivery failed, placeholder left to expire");
        }
        Err(e) => {
            metrics.delivery_failed();
            error!(error = %e, "Delivery task aborted");
        }
    }
}
