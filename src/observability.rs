//! Observability (metrics, tracing)

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Metrics handle for recording parse outcome counters
#[derive(Debug, Default)]
pub struct Metrics {
    parses_completed: AtomicU64,
    history_reused: AtomicU64,
    requests_rejected: AtomicU64,
    parses_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_completed(&self) {
        self.parses_completed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "parses_completed", "Metric incremented");
    }

    pub fn history_reused(&self) {
        self.history_reused.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "history_reused", "Metric incremented");
    }

    pub fn request_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "requests_rejected", "Metric incremented");
    }

    pub fn parse_failed(&self) {
        self.parses_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "parses_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            parses_completed: self.parses_completed.load(Ordering::Relaxed),
            history_reused: self.history_reused.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            parses_failed: self.parses_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub parses_completed: u64,
    pub history_reused: u64,
    pub requests_rejected: u64,
    pub parses_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();
        metrics.parse_completed();
        metrics.request_rejected();
        metrics.request_rejected();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.parses_completed, 1);
        assert_eq!(snapshot.requests_rejected, 2);
        assert_eq!(snapshot.parses_failed, 0);
    }
}
