//! Notification kind enumeration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What another user did to produce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Someone liked one of the recipient's posts.
    Like,
    /// Someone commented on one of the recipient's posts.
    Comment,
}

impl NotificationKind {
    /// Return the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
        }
    }

    /// Past-tense verb used in notification summaries.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Like => "liked",
            Self::Comment => "commented on",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
