//! Personal notification session: pushes unread counters.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use social_core::types::id::ConnectionId;

use crate::channel::label::GroupLabel;
use crate::connection::handle::ConnectionHandle;
use crate::connection::membership::MembershipGuard;
use crate::error::RealtimeError;
use crate::message::types::{GroupEvent, OutboundFrame};

use super::{Inbox, RealtimeSession, SessionContext, SessionState};

/// Serves one connection joined to its principal's personal group.
///
/// Triggers carry no counts. Every trigger re-reads the authoritative
/// count from the store, so duplicated or missed triggers heal on the next
/// one.
#[derive(Debug)]
pub struct NotificationSession {
    ctx: SessionContext,
    handle: Arc<ConnectionHandle>,
    state: SessionState,
    channel: Option<MembershipGuard>,
}

impl NotificationSession {
    pub fn new(ctx: SessionContext, handle: Arc<ConnectionHandle>) -> Self {
        Self {
            ctx,
            handle,
            state: SessionState::Connecting,
            channel: None,
        }
    }
}

#[async_trait]
impl RealtimeSession for NotificationSession {
    fn connection_id(&self) -> ConnectionId {
        self.handle.id
    }

    fn state(&self) -> SessionState {
        self.state
    }

    async fn open(&mut self) -> Result<(), RealtimeError> {
        let user_id = self.handle.principal()?.user_id;
        let label = GroupLabel::user(user_id);
        self.channel = Some(self.ctx.registry.join(&self.handle, label.clone())?);
        self.state = SessionState::Open;

        info!(conn_id = %self.handle.id, group = %label, "Notification session opened");
        Ok(())
    }

    async fn on_frame(&mut self, raw: &str, _inbox: &mut Inbox) -> Result<(), RealtimeError> {
        self.ctx.metrics.frame_received();
        debug!(conn_id = %self.handle.id, len = raw.len(), "Notification session ignores client frame");
        Ok(())
    }

    async fn on_event(&mut self, event: GroupEvent) -> Result<Option<OutboundFrame>, RealtimeError> {
        let user_id = self.handle.principal()?.user_id;
        let store = &self.ctx.store;

        let recount = match event {
            GroupEvent::UnreadMessage => store
                .unread_message_count(user_id)
                .await
                .map(|count| OutboundFrame::UnreadMessageUpdate { count }),
            GroupEvent::UnreadNotification => store
                .unread_notification_count(user_id)
                .await
                .map(|count| OutboundFrame::UnreadNotificationUpdate { count }),
            GroupEvent::ChatMessage { .. } => return Ok(None),
        };

        match recount {
            Ok(frame) => Ok(Some(frame)),
            Err(e) => {
                // The next trigger recomputes from scratch.
                warn!(conn_id = %self.handle.id, error = %e, "Unread recount failed");
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        self.channel.take();
        self.ctx.registry.close(self.handle.id);
        self.ctx.metrics.connection_closed();
        debug!(conn_id = %self.handle.id, "Notification session closed");
    }
}

impl Drop for NotificationSession {
    fn drop(&mut self) {
        self.close();
    }
}
