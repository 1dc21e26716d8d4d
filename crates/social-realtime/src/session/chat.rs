//! 1:1 chat session.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use social_core::types::id::ConnectionId;
use social_core::types::principal::Principal;

use crate::channel::label::GroupLabel;
use crate::connection::handle::ConnectionHandle;
use crate::connection::membership::MembershipGuard;
use crate::error::RealtimeError;
use crate::message::codec::decode_chat;
use crate::message::types::{GroupEvent, OutboundFrame};

use super::{Inbox, RealtimeSession, SessionContext, SessionState};

/// Serves one connection bound to the conversation between its principal
/// and `peer_username`.
#[derive(Debug)]
pub struct ChatSession {
    ctx: SessionContext,
    handle: Arc<ConnectionHandle>,
    peer_username: String,
    state: SessionState,
    room: Option<MembershipGuard>,
}

impl ChatSession {
    pub fn new(
        ctx: SessionContext,
        handle: Arc<ConnectionHandle>,
        peer_username: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            handle,
            peer_username: peer_username.into(),
            state: SessionState::Connecting,
            room: None,
        }
    }

    /// Room label of this conversation.
    pub fn room_label(&self) -> Result<GroupLabel, RealtimeError> {
        let principal = self.handle.principal()?;
        Ok(GroupLabel::room(&principal.username, &self.peer_username))
    }

    fn joined_room(&self) -> Result<&MembershipGuard, RealtimeError> {
        self.room.as_ref().ok_or(RealtimeError::NotOpen {
            conn_id: self.handle.id,
        })
    }

    /// Clears what the peer sent us before this connection opened.
    async fn mark_peer_messages_read(&self, principal: &Principal) {
        let store = &self.ctx.store;
        let peer = match store.find_user(&self.peer_username).await {
            Ok(Some(peer)) => peer,
            Ok(None) => {
                debug!(conn_id = %self.handle.id, peer = %self.peer_username, "Peer does not exist");
                return;
            }
            Err(e) => {
                warn!(conn_id = %self.handle.id, error = %e, "Peer lookup failed on open");
                return;
            }
        };

        match store.mark_read(peer.id, principal.user_id).await {
            Ok(count) => {
                debug!(conn_id = %self.handle.id, peer = %peer.username, count, "Marked messages read")
            }
            Err(e) => warn!(conn_id = %self.handle.id, error = %e, "Failed to mark messages read"),
        }
    }
}

#[async_trait]
impl RealtimeSession for ChatSession {
    fn connection_id(&self) -> ConnectionId {
        self.handle.id
    }

    fn state(&self) -> SessionState {
        self.state
    }

    async fn open(&mut self) -> Result<(), RealtimeError> {
        let principal = self.handle.principal()?.clone();
        let label = GroupLabel::room(&principal.username, &self.peer_username);
        self.room = Some(self.ctx.registry.join(&self.handle, label.clone())?);
        self.state = SessionState::Open;

        info!(
            conn_id = %self.handle.id,
            user = %principal.username,
            room = %label,
            "Chat session opened"
        );

        self.mark_peer_messages_read(&principal).await;
        Ok(())
    }

    async fn on_frame(&mut self, raw: &str, inbox: &mut Inbox) -> Result<(), RealtimeError> {
        self.ctx.metrics.frame_received();
        let room = self.joined_room()?;

        let chat = decode_chat(raw, self.ctx.max_message_length)?;
        if chat.is_blank() {
            debug!(conn_id = %self.handle.id, "Ignoring blank message");
            return Ok(());
        }

        let principal = self.handle.principal()?;
        let receiver = self
            .ctx
            .store
            .find_user(&self.peer_username)
            .await
            .map_err(RealtimeError::Persistence)?
            .ok_or_else(|| RealtimeError::ReceiverNotFound(self.peer_username.clone()))?;

        let sequencer = room.sequencer();
        let order = inbox.lock_draining(&sequencer).await;

        let message = self
            .ctx
            .store
            .create_message(principal.user_id, receiver.id, &chat.message)
            .await
            .map_err(RealtimeError::Persistence)?;
        self.ctx.metrics.message_persisted();

        self.ctx
            .broadcaster
            .publish(room.label(), GroupEvent::chat(&message, &principal.username))
            .await;
        drop(order);

        self.ctx
            .broadcaster
            .publish(&GroupLabel::user(receiver.id), GroupEvent::UnreadMessage)
            .await;
        Ok(())
    }

    async fn on_event(&mut self, event: GroupEvent) -> Result<Option<OutboundFrame>, RealtimeError> {
        match event {
            GroupEvent::ChatMessage {
                message,
                sender,
                timestamp,
            } => Ok(Some(OutboundFrame::ChatMessage {
                message,
                sender,
                timestamp,
            })),
            other => {
                debug!(conn_id = %self.handle.id, event = other.name(), "Chat session ignores event");
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        let was_open = self.state == SessionState::Open;
        self.state = SessionState::Closed;
        self.room.take();
        self.ctx.registry.close(self.handle.id);
        self.ctx.metrics.connection_closed();
        if was_open {
            debug!(conn_id = %self.handle.id, "Chat session closed");
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}
