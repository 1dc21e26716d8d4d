//! Broker metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Broker-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Total connections opened
    pub connections_total: AtomicU64,
    /// Connections currently open
    pub connections_active: AtomicU64,
    /// Total inbound frames received
    pub frames_received: AtomicU64,
    /// Total group publishes
    pub events_published: AtomicU64,
    /// Total successful per-member deliveries
    pub deliveries: AtomicU64,
    /// Total failed per-member deliveries
    pub delivery_failures: AtomicU64,
    /// Total chat messages persisted
    pub messages_persisted: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one publish and its per-member outcome.
    pub fn published(&self, delivered: u64, failed: u64) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered, Ordering::Relaxed);
        self.delivery_failures.fetch_add(failed, Ordering::Relaxed);
    }

    pub fn message_persisted(&self) {
        self.messages_persisted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            messages_persisted: self.messages_persisted.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total connections ever opened
    pub connections_total: u64,
    /// Currently open connections
    pub connections_active: u64,
    /// Total inbound frames
    pub frames_received: u64,
    /// Total group publishes
    pub events_published: u64,
    /// Total successful deliveries
    pub deliveries: u64,
    /// Total failed deliveries
    pub delivery_failures: u64,
    /// Total persisted chat messages
    pub messages_persisted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_never_underflows() {
        let metrics = RealtimeMetrics::new();
        metrics.connection_closed();
        metrics.connection_opened();
        metrics.connection_closed();
        metrics.connection_closed();

        let snap = metrics.snapshot();
        assert_eq!(snap.connections_total, 1);
        assert_eq!(snap.connections_active, 0);
    }

    #[test]
    fn test_published_accumulates() {
        let metrics = RealtimeMetrics::new();
        metrics.published(3, 1);
        metrics.published(0, 0);

        let snap = metrics.snapshot();
        assert_eq!(snap.events_published, 2);
        assert_eq!(snap.deliveries, 3);
        assert_eq!(snap.delivery_failures, 1);
    }
}
