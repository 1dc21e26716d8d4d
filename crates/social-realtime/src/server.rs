//! Top-level realtime engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use social_core::config::RealtimeConfig;
use social_core::types::principal::Principal;

use crate::bridge::event_bridge::EventBridge;
use crate::broadcast::GroupBroadcaster;
use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::ConnectionRegistry;
use crate::message::types::GroupEvent;
use crate::metrics::RealtimeMetrics;
use crate::session::chat::ChatSession;
use crate::session::notification::NotificationSession;
use crate::session::SessionContext;
use crate::store::ChatStore;

/// Central realtime engine shared by every socket handler.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Group fan-out.
    pub broadcaster: Arc<GroupBroadcaster>,
    /// Write path → fan-out bridge.
    pub event_bridge: Arc<EventBridge>,
    /// Storage collaborator.
    pub store: Arc<dyn ChatStore>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.registry.connection_count())
            .field("groups", &self.registry.group_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new realtime engine over `store`.
    pub fn new(mut config: RealtimeConfig, store: Arc<dyn ChatStore>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        if config.inbox_buffer_size < RealtimeConfig::MIN_INBOX_BUFFER {
            warn!(
                configured = config.inbox_buffer_size,
                minimum = RealtimeConfig::MIN_INBOX_BUFFER,
                "Inbox buffer too small, raising to minimum"
            );
            config.inbox_buffer_size = RealtimeConfig::MIN_INBOX_BUFFER;
        }

        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new(config.inbox_buffer_size));
        let broadcaster = Arc::new(GroupBroadcaster::new(
            Arc::clone(&registry),
            Arc::clone(&metrics),
            config.send_timeout(),
        ));
        let event_bridge = Arc::new(EventBridge::new(Arc::clone(&store), Arc::clone(&broadcaster)));

        info!(
            inbox_buffer = config.inbox_buffer_size,
            send_timeout_ms = config.send_timeout_ms,
            "Realtime engine initialized"
        );

        Self {
            registry,
            broadcaster,
            event_bridge,
            store,
            metrics,
            config,
            shutdown_tx,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Collaborators handed to sessions.
    pub fn context(&self) -> SessionContext {
        SessionContext {
            registry: Arc::clone(&self.registry),
            broadcaster: Arc::clone(&self.broadcaster),
            store: Arc::clone(&self.store),
            metrics: Arc::clone(&self.metrics),
            max_message_length: self.config.max_message_length,
        }
    }

    /// Registers a connection for an authenticated principal.
    pub fn open_connection(
        &self,
        principal: Principal,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<GroupEvent>) {
        self.metrics.connection_opened();
        self.registry.open(Some(principal))
    }

    /// Opens a connection and builds a chat session with `peer_username`.
    pub fn chat_session(
        &self,
        principal: Principal,
        peer_username: &str,
    ) -> (ChatSession, mpsc::Receiver<GroupEvent>) {
        let (handle, events) = self.open_connection(principal);
        (ChatSession::new(self.context(), handle, peer_username), events)
    }

    /// Opens a connection and builds a notification session.
    pub fn notification_session(
        &self,
        principal: Principal,
    ) -> (NotificationSession, mpsc::Receiver<GroupEvent>) {
        let (handle, events) = self.open_connection(principal);
        (NotificationSession::new(self.context(), handle), events)
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the realtime engine.
    pub fn shutdown(&self) {
        info!(
            connections = self.registry.connection_count(),
            "Shutting down realtime engine"
        );

        // Signal all sessions to stop
        let _ = self.shutdown_tx.send(());

        self.registry.close_all();
        info!("Realtime engine shut down");
    }
}
