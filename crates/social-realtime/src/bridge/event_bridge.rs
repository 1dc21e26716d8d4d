//! Domain write → unread trigger mapping.
//!
//! Request handlers that change what a user has unread go through here so
//! that the user's open notification sockets refresh.

use std::sync::Arc;

use tracing::{debug, info};

use social_core::result::AppResult;
use social_core::types::id::UserId;
use social_entity::notification::{NewNotification, Notification};

use crate::broadcast::GroupBroadcaster;
use crate::channel::label::GroupLabel;
use crate::message::types::GroupEvent;
use crate::store::ChatStore;

/// Bridges domain writes into the realtime system.
#[derive(Debug)]
pub struct EventBridge {
    store: Arc<dyn ChatStore>,
    broadcaster: Arc<GroupBroadcaster>,
}

impl EventBridge {
    /// Create a new event bridge
    pub fn new(store: Arc<dyn ChatStore>, broadcaster: Arc<GroupBroadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// Persists a like/comment notification and triggers the recipient's
    /// notification sockets.
    ///
    /// Acting on your own post produces nothing and returns `None`.
    pub async fn on_notification_created(
        &self,
        draft: NewNotification,
    ) -> AppResult<Option<Notification>> {
        if draft.user_id == draft.created_by {
            debug!(user_id = %draft.user_id, "Skipping self-notification");
            return Ok(None);
        }

        let notification = self.store.create_notification(&draft).await?;
        let attempted = self
            .broadcaster
            .publish(&GroupLabel::user(notification.user_id), GroupEvent::UnreadNotification)
            .await;

        info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = notification.kind.as_str(),
            sockets = attempted,
            "Notification created"
        );
        Ok(Some(notification))
    }

    /// Marks all of `user_id`'s notifications read and refreshes every
    /// socket they have open.
    pub async fn on_notifications_read(&self, user_id: UserId) -> AppResult<u64> {
        let changed = self.store.mark_notifications_read(user_id).await?;
        self.broadcaster
            .publish(&GroupLabel::user(user_id), GroupEvent::UnreadNotification)
            .await;

        debug!(user_id = %user_id, changed, "Notifications marked read");
        Ok(changed)
    }
}
