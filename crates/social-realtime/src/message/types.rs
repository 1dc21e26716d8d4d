//! Group events and socket frame definitions.

use serde::{Deserialize, Deserializer, Serialize};

use social_entity::message::Message;

/// Event fanned out to the members of a group.
///
/// Events travel through each member's inbox and are turned into socket
/// frames by the owning session, never written to a socket directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GroupEvent {
    /// A chat message was persisted in a room.
    #[serde(rename = "chat.message")]
    ChatMessage {
        /// Message body.
        message: String,
        /// Username of the sender.
        sender: String,
        /// ISO-8601 persist time.
        timestamp: String,
    },
    /// Content-free trigger: the target's unread message count changed.
    #[serde(rename = "unread.message")]
    UnreadMessage,
    /// Content-free trigger: the target's unread notification count changed.
    #[serde(rename = "unread.notification")]
    UnreadNotification,
}

impl GroupEvent {
    /// Builds the room event for a freshly persisted message.
    pub fn chat(message: &Message, sender: &str) -> Self {
        Self::ChatMessage {
            message: message.content.clone(),
            sender: sender.to_string(),
            timestamp: message.timestamp_iso(),
        }
    }

    /// Event name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChatMessage { .. } => "chat.message",
            Self::UnreadMessage => "unread.message",
            Self::UnreadNotification => "unread.notification",
        }
    }
}

/// Frame written to a client socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundFrame {
    /// Chat message delivered to a room member.
    #[serde(rename = "chat.message")]
    ChatMessage {
        message: String,
        sender: String,
        timestamp: String,
    },
    /// Recoverable error, reported to the sender only.
    #[serde(rename = "error")]
    Error { message: String },
    /// Fresh unread message count.
    #[serde(rename = "unread_message_update")]
    UnreadMessageUpdate { count: i64 },
    /// Fresh unread notification count.
    #[serde(rename = "unread_notification_update")]
    UnreadNotificationUpdate { count: i64 },
}

impl OutboundFrame {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Chat payload sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundChat {
    /// Message body. May be blank or `null`; both are dropped by the session.
    #[serde(deserialize_with = "nullable_text")]
    pub message: String,
}

/// Reads `null` as an empty body. The key itself stays required.
fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl InboundChat {
    /// Whether the body has any non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.message.trim().is_empty()
    }
}
