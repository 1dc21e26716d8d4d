//! Group labels and the canonical room key.

use std::fmt;

use serde::{Deserialize, Serialize};

use social_core::types::id::UserId;

/// Name of a broadcast group.
///
/// A room is shared by exactly two participants and is stored with its
/// participants already ordered, so the label does not depend on who
/// opened the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupLabel {
    /// 1:1 conversation between two usernames.
    Room {
        /// Lower username.
        low: String,
        /// Higher username.
        high: String,
    },
    /// Personal notification channel of a user.
    User {
        /// Owner of the channel.
        user_id: UserId,
    },
}

/// Coarse shape of a label; a connection joins at most one group per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Conversation room.
    Room,
    /// Personal channel.
    User,
}

impl GroupLabel {
    /// Room shared by `a` and `b`, in either order.
    pub fn room(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self::Room {
            low: low.to_string(),
            high: high.to_string(),
        }
    }

    /// Personal notification channel of `user_id`.
    pub fn user(user_id: UserId) -> Self {
        Self::User { user_id }
    }

    /// Returns the label's kind.
    pub fn kind(&self) -> GroupKind {
        match self {
            Self::Room { .. } => GroupKind::Room,
            Self::User { .. } => GroupKind::User,
        }
    }
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room { low, high } => write!(f, "chat_{low}_{high}"),
            Self::User { user_id } => write!(f, "user_{user_id}"),
        }
    }
}

/// Canonical room identifier: `chat_{min}_{max}` under username ordering.
pub fn room_key(a: &str, b: &str) -> String {
    GroupLabel::room(a, b).to_string()
}
