//! Tracing setup and delivery counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "roxy=info,tower_http=info";

/// Installs the global fmt subscriber; `RUST_LOG` overrides the default filter
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    interactions_received: AtomicU64,
    deliveries_scheduled: AtomicU64,
    deliveries_rejected: AtomicU64,
    deliveries_completed: AtomicU64,
    deliveries_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interaction_received(&self) {
        self.interactions_received.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "interactions_received", "Metric incremented");
    }

    pub fn delivery_scheduled(&self) {
        self.deliveries_scheduled.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "deliveries_scheduled", "Metric incremented");
    }

    pub fn delivery_rejected(&self) {
        self.deliveries_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "deliveries_rejected", "Metric incremented");
    }

    pub fn delivery_completed(&self) {
        self.deliveries_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "deliveries_completed", "Metric incremented");
    }

    pub fn delivery_failed(&self) {
        self.deliveries_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "deliveries_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            interactions_received: self.interactions_received.load(Ordering::Relaxed),
            deliveries_scheduled: self.deliveries_scheduled.load(Ordering::Relaxed),
            deliveries_rejected: self.deliveries_rejected.load(Ordering::Relaxed),
            deliveries_completed: self.deliveries_completed.load(Ordering::Relaxed),
            deliveries_failed: self.deliveries_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub interactions_received: u64,
    pub deliveries_scheduled: u64,
    pub deliveries_rejected: u64,
    pub deliveries_completed: u64,
    pub deliveries_failed: u64,
}
