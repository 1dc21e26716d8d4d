//! Storage seam consumed by the sessions and the write-path bridge.
//!
//! The broker never builds queries itself; everything it reads or writes
//! goes through [`ChatStore`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use social_core::result::AppResult;
use social_core::types::id::UserId;
use social_entity::message::Message;
use social_entity::notification::{NewNotification, Notification};
use social_entity::user::User;

pub use memory::MemoryChatStore;
pub use postgres::PgChatStore;

/// Persistence operations the broker depends on.
#[async_trait]
pub trait ChatStore: Send + Sync + std::fmt::Debug + 'static {
    /// Looks a user up by exact username.
    async fn find_user(&self, username: &str) -> AppResult<Option<User>>;

    /// Persists a message. The store assigns the timestamp, which never
    /// decreases between successive calls.
    async fn create_message(
        &self,
        sender: UserId,
        receiver: UserId,
        content: &str,
    ) -> AppResult<Message>;

    /// Marks every unread message from `sender` to `receiver` as read and
    /// returns how many changed.
    async fn mark_read(&self, sender: UserId, receiver: UserId) -> AppResult<u64>;

    /// Unread messages addressed to `user`.
    async fn unread_message_count(&self, user: UserId) -> AppResult<i64>;

    /// Unread notifications addressed to `user`.
    async fn unread_notification_count(&self, user: UserId) -> AppResult<i64>;

    /// Persists a notification.
    async fn create_notification(&self, draft: &NewNotification) -> AppResult<Notification>;

    /// Marks all of `user`'s notifications as read.
    async fn mark_notifications_read(&self, user: UserId) -> AppResult<u64>;
}
