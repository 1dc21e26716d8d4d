//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use social_core::types::id::{NotificationId, UserId};

use super::kind::NotificationKind;

/// A notification addressed to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient.
    pub user_id: UserId,
    /// The user whose action produced the notification.
    pub created_by: UserId,
    /// Like or comment.
    pub kind: NotificationKind,
    /// Post the action targeted, if any.
    pub post_id: Option<Uuid>,
    /// Comment that was written, if any.
    pub comment_id: Option<Uuid>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// Whether the recipient has seen it.
    pub is_read: bool,
}

impl Notification {
    /// One-line summary, e.g. `"alice liked your post"`.
    pub fn summary(&self, actor_username: &str) -> String {
        format!("{actor_username} {} your post", self.kind.verb())
    }
}

/// Fields supplied by the write path when a notification is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    /// The recipient.
    pub user_id: UserId,
    /// The acting user.
    pub created_by: UserId,
    /// Like or comment.
    pub kind: NotificationKind,
    /// Post the action targeted, if any.
    pub post_id: Option<Uuid>,
    /// Comment that was written, if any.
    pub comment_id: Option<Uuid>,
}
