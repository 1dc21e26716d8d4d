//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use social_entity::notification::NotificationKind;

/// Body of `POST /api/notifications`: the caller liked or commented on a
/// post owned by `recipient`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    /// Username of the post owner.
    #[validate(length(min = 1, max = 150, message = "Recipient username is required"))]
    pub recipient: String,
    /// Like or comment.
    pub kind: NotificationKind,
    /// Target post.
    pub post_id: Option<Uuid>,
    /// Comment written, for comment notifications.
    pub comment_id: Option<Uuid>,
}

/// Token for socket upgrades, as a query parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsTokenQuery {
    /// JWT access token.
    pub token: Option<String>,
}
