//! PostgreSQL-backed store.

use async_trait::async_trait;

use social_core::result::AppResult;
use social_core::types::id::UserId;
use social_database::DatabasePool;
use social_database::repositories::{MessageRepository, NotificationRepository, UserRepository};
use social_entity::message::Message;
use social_entity::notification::{NewNotification, Notification};
use social_entity::user::User;

use super::ChatStore;

/// [`ChatStore`] over the sqlx repositories.
#[derive(Debug, Clone)]
pub struct PgChatStore {
    users: UserRepository,
    messages: MessageRepository,
    notifications: NotificationRepository,
}

impl PgChatStore {
    /// Builds the store on a connected pool.
    pub fn new(db: &DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            users: UserRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
        }
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn find_user(&self, username: &str) -> AppResult<Option<User>> {
        self.users.find_by_username(username).await
    }

    async fn create_message(
        &self,
        sender: UserId,
        receiver: UserId,
        content: &str,
    ) -> AppResult<Message> {
        self.messages.create(sender, receiver, content).await
    }

    async fn mark_read(&self, sender: UserId, receiver: UserId) -> AppResult<u64> {
        self.messages.mark_read(sender, receiver).await
    }

    async fn unread_message_count(&self, user: UserId) -> AppResult<i64> {
        self.messages.count_unread(user).await
    }

    async fn unread_notification_count(&self, user: UserId) -> AppResult<i64> {
        self.notifications.count_unread(user).await
    }

    async fn create_notification(&self, draft: &NewNotification) -> AppResult<Notification> {
        self.notifications.create(draft).await
    }

    async fn mark_notifications_read(&self, user: UserId) -> AppResult<u64> {
        self.notifications.mark_all_read(user).await
    }
}
