//! Individual connection handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;

use social_core::types::id::ConnectionId;
use social_core::types::principal::Principal;

use crate::error::RealtimeError;
use crate::message::types::GroupEvent;

/// A handle to a single open connection.
///
/// Publishers reach the connection only through its inbox; the session
/// task that owns the socket drains the inbox and writes frames.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Authenticated identity, if any
    pub principal: Option<Principal>,
    /// Sender side of the session inbox
    inbox: mpsc::Sender<GroupEvent>,
    /// When the connection was opened
    pub connected_at: DateTime<Utc>,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(principal: Option<Principal>, inbox: mpsc::Sender<GroupEvent>) -> Self {
        Self {
            id: ConnectionId::new(),
            principal,
            inbox,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Authenticated identity, or `AuthRequired`.
    pub fn principal(&self) -> Result<&Principal, RealtimeError> {
        self.principal.as_ref().ok_or(RealtimeError::AuthRequired)
    }

    /// Queue an event for this connection, waiting at most `timeout` for
    /// inbox capacity.
    pub async fn deliver(&self, event: GroupEvent, timeout: Duration) -> Result<(), RealtimeError> {
        if !self.is_alive() {
            return Err(self.delivery_error("connection closed"));
        }
        match self.inbox.send_timeout(event, timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => Err(self.delivery_error("inbox full")),
            Err(SendTimeoutError::Closed(_)) => {
                self.mark_closed();
                Err(self.delivery_error("inbox closed"))
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as closed
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    fn delivery_error(&self, reason: &'static str) -> RealtimeError {
        RealtimeError::Delivery {
            conn_id: self.id,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use social_core::types::id::UserId;

    use super::*;

    fn handle(buffer: usize) -> (ConnectionHandle, mpsc::Receiver<GroupEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        let principal = Principal::new(UserId::new(), "alice");
        (ConnectionHandle::new(Some(principal), tx), rx)
    }

    #[tokio::test]
    async fn test_deliver_queues_event() {
        let (handle, mut rx) = handle(4);
        handle
            .deliver(GroupEvent::UnreadMessage, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(rx.recv().await, Some(GroupEvent::UnreadMessage));
    }

    #[tokio::test]
    async fn test_deliver_times_out_when_full() {
        let (handle, _rx) = handle(1);
        let timeout = Duration::from_millis(20);
        handle.deliver(GroupEvent::UnreadMessage, timeout).await.unwrap();

        let err = handle
            .deliver(GroupEvent::UnreadMessage, timeout)
            .await
            .unwrap_err();
        assert!(matches!(err, RealtimeError::Delivery { reason: "inbox full", .. }));
        assert!(handle.is_alive());
    }

    #[tokio::test]
    async fn test_deliver_to_dropped_inbox_marks_closed() {
        let (handle, rx) = handle(1);
        drop(rx);

        let err = handle
            .deliver(GroupEvent::UnreadNotification, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, RealtimeError::Delivery { reason: "inbox closed", .. }));
        assert!(!handle.is_alive());
    }

    #[test]
    fn test_anonymous_principal_is_auth_required() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(None, tx);
        assert!(matches!(handle.principal(), Err(RealtimeError::AuthRequired)));
    }
}
