//! Group fan-out.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{trace, warn};

use crate::channel::label::GroupLabel;
use crate::connection::registry::ConnectionRegistry;
use crate::message::types::GroupEvent;
use crate::metrics::RealtimeMetrics;

/// Delivers events to every current member of a group.
#[derive(Debug)]
pub struct GroupBroadcaster {
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
    send_timeout: Duration,
}

impl GroupBroadcaster {
    /// Creates a broadcaster over `registry`; each member delivery waits at
    /// most `send_timeout`.
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        metrics: Arc<RealtimeMetrics>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            metrics,
            send_timeout,
        }
    }

    /// Sends `event` to a snapshot of the group's members and returns how
    /// many were attempted.
    ///
    /// Deliveries run concurrently and independently. A member whose
    /// delivery fails is dismissed from the group; the failure never
    /// reaches the caller. The call returns once every attempt has
    /// settled, so successive publishes from one caller arrive in order.
    pub async fn publish(&self, label: &GroupLabel, event: GroupEvent) -> usize {
        let members = self.registry.members_of(label);
        if members.is_empty() {
            trace!(group = %label, event = event.name(), "Publish to empty group");
            self.metrics.published(0, 0);
            return 0;
        }

        let outcomes = join_all(members.iter().map(|member| {
            let event = event.clone();
            async move { (member, member.deliver(event, self.send_timeout).await) }
        }))
        .await;

        let mut failed = 0u64;
        for (member, outcome) in outcomes {
            if let Err(err) = outcome {
                failed += 1;
                warn!(
                    conn_id = %member.id,
                    group = %label,
                    event = event.name(),
                    error = %err,
                    "Delivery failed, dismissing member"
                );
                self.registry.dismiss(member.id, label);
            }
        }

        let attempted = members.len();
        self.metrics.published(attempted as u64 - failed, failed);
        trace!(group = %label, event = event.name(), attempted, failed, "Published");
        attempted
    }
}
