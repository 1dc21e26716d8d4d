//! Per-connection session actors.
//!
//! A session owns one client connection for its whole life. [`drive`] runs
//! it: inbound socket frames, group events from the connection's inbox and
//! the engine shutdown signal are multiplexed in one task, so a session
//! never blocks another one.

pub mod chat;
pub mod inbox;
pub mod notification;

use std::sync::Arc;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use social_core::types::id::ConnectionId;

use crate::broadcast::GroupBroadcaster;
use crate::connection::registry::ConnectionRegistry;
use crate::error::RealtimeError;
use crate::message::codec::encode_frame;
use crate::message::types::{GroupEvent, OutboundFrame};
use crate::metrics::RealtimeMetrics;
use crate::store::ChatStore;

pub use chat::ChatSession;
pub use inbox::Inbox;
pub use notification::NotificationSession;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted but not yet joined to its group.
    Connecting,
    /// Joined and serving traffic.
    Open,
    /// Terminal.
    Closed,
}

/// Shared collaborators handed to every session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub registry: Arc<ConnectionRegistry>,
    pub broadcaster: Arc<GroupBroadcaster>,
    pub store: Arc<dyn ChatStore>,
    pub metrics: Arc<RealtimeMetrics>,
    /// Largest accepted inbound frame, in bytes.
    pub max_message_length: usize,
}

/// A connection-scoped actor.
#[async_trait]
pub trait RealtimeSession: Send {
    /// The served connection.
    fn connection_id(&self) -> ConnectionId;

    /// Current lifecycle state.
    fn state(&self) -> SessionState;

    /// `Connecting -> Open`: joins the session's group.
    async fn open(&mut self) -> Result<(), RealtimeError>;

    /// Handles one inbound text frame. Recoverable errors are reported to
    /// the client by the caller.
    ///
    /// Any wait on a group's ordering lock goes through `inbox` so that
    /// deliveries to this connection keep flowing meanwhile.
    async fn on_frame(&mut self, raw: &str, inbox: &mut Inbox) -> Result<(), RealtimeError>;

    /// Turns a group event into a frame for this client, if it has one.
    async fn on_event(&mut self, event: GroupEvent) -> Result<Option<OutboundFrame>, RealtimeError>;

    /// `* -> Closed`: leaves every group. Idempotent.
    fn close(&mut self);
}

/// Runs a session until the client goes away, the inbox closes, the engine
/// shuts down, or a fatal error occurs.
///
/// Encoded frames are pushed to `outbound`; the socket writer on the other
/// end owns the transport. The session is always closed on return.
pub async fn drive<S, I>(
    mut session: S,
    mut inbound: I,
    events: mpsc::Receiver<GroupEvent>,
    outbound: mpsc::Sender<String>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), RealtimeError>
where
    S: RealtimeSession,
    I: Stream<Item = String> + Unpin + Send,
{
    let conn_id = session.connection_id();
    let mut inbox = Inbox::new(events);
    let result = run(&mut session, &mut inbound, &mut inbox, &outbound, &mut shutdown).await;
    session.close();

    match &result {
        Ok(()) => debug!(conn_id = %conn_id, "Session ended"),
        Err(err) => warn!(conn_id = %conn_id, error = %err, "Session ended with error"),
    }
    result
}

async fn run<S, I>(
    session: &mut S,
    inbound: &mut I,
    inbox: &mut Inbox,
    outbound: &mpsc::Sender<String>,
    shutdown: &mut broadcast::Receiver<()>,
) -> Result<(), RealtimeError>
where
    S: RealtimeSession,
    I: Stream<Item = String> + Unpin + Send,
{
    session.open().await?;

    loop {
        // Drain queued events before reading more input so that a chatty
        // client cannot fill its own inbox.
        tokio::select! {
            biased;

            _ = shutdown.recv() => return Ok(()),
            event = inbox.recv() => {
                let Some(event) = event else { return Ok(()) };
                if let Some(frame) = session.on_event(event).await? {
                    send(outbound, &frame).await?;
                }
            }
            frame = inbound.next() => {
                let Some(raw) = frame else { return Ok(()) };
                match session.on_frame(&raw, inbox).await {
                    Ok(()) => {}
                    Err(err) if err.is_recoverable() => {
                        debug!(conn_id = %session.connection_id(), error = %err, "Rejected frame");
                        send(outbound, &OutboundFrame::error(err.client_message())).await?;
                    }
                    Err(err) => return Err(err),
                }
            }
        }
    }
}

async fn send(outbound: &mpsc::Sender<String>, frame: &OutboundFrame) -> Result<(), RealtimeError> {
    let text = encode_frame(frame)?;
    outbound
        .send(text)
        .await
        .map_err(|_| RealtimeError::OutboundClosed)
}
