//! Error taxonomy of the realtime layer.

use thiserror::Error;

use social_core::error::{AppError, ErrorKind};
use social_core::types::id::ConnectionId;

/// Errors raised while serving realtime connections.
///
/// Only [`RealtimeError::Decode`], [`RealtimeError::ReceiverNotFound`] and
/// [`RealtimeError::Persistence`] are reported to the client with the
/// connection kept open; the others end it.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// The connection carries no authenticated principal.
    #[error("authentication required")]
    AuthRequired,

    /// An inbound frame could not be decoded.
    #[error("invalid payload: {0}")]
    Decode(String),

    /// The other participant of the conversation does not exist.
    #[error("receiver '{0}' not found")]
    ReceiverNotFound(String),

    /// The storage collaborator failed.
    #[error("persistence failure: {0}")]
    Persistence(#[source] AppError),

    /// One member could not be reached during a group publish.
    #[error("delivery to {conn_id} failed: {reason}")]
    Delivery {
        /// Member that was not reached.
        conn_id: ConnectionId,
        /// Why delivery failed.
        reason: &'static str,
    },

    /// A connection tried to join a second group of the same kind.
    #[error("connection {conn_id} already belongs to {existing}")]
    MembershipConflict {
        /// The connection.
        conn_id: ConnectionId,
        /// The group it already belongs to.
        existing: String,
    },

    /// A frame reached a session that has not joined its group.
    #[error("session {conn_id} is not open")]
    NotOpen {
        /// The connection.
        conn_id: ConnectionId,
    },

    /// An outbound frame could not be serialized.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    /// The client's writer went away.
    #[error("outbound channel closed")]
    OutboundClosed,
}

impl RealtimeError {
    /// Whether the connection keeps going after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Decode(_) | Self::ReceiverNotFound(_) | Self::Persistence(_)
        )
    }

    /// Text placed in the `error` frame sent back to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::Decode(_) => "Invalid data format.",
            Self::ReceiverNotFound(_) => "Receiver user not found.",
            Self::Persistence(_) => "Message could not be saved.",
            Self::AuthRequired => "Authentication required.",
            _ => "Internal error.",
        }
    }
}

impl From<RealtimeError> for AppError {
    fn from(err: RealtimeError) -> Self {
        match err {
            RealtimeError::AuthRequired => AppError::unauthorized("Authentication required"),
            RealtimeError::Decode(detail) => AppError::validation(detail),
            RealtimeError::ReceiverNotFound(username) => {
                AppError::not_found(format!("User '{username}' not found"))
            }
            RealtimeError::Persistence(source) => source,
            conflict @ RealtimeError::MembershipConflict { .. } => {
                AppError::conflict(conflict.to_string())
            }
            RealtimeError::Encode(e) => e.into(),
            other @ (RealtimeError::Delivery { .. }
            | RealtimeError::NotOpen { .. }
            | RealtimeError::OutboundClosed) => {
                AppError::new(ErrorKind::Internal, other.to_string())
            }
        }
    }
}
