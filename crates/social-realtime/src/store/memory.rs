//! In-process store, used by tests and by `database.url = "memory"`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use social_core::error::AppError;
use social_core::result::AppResult;
use social_core::types::id::{MessageId, NotificationId, UserId};
use social_entity::message::Message;
use social_entity::notification::{NewNotification, Notification};
use social_entity::user::User;

use super::ChatStore;

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, User>,
    messages: Vec<Message>,
    notifications: Vec<Notification>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    /// Wall clock, nudged forward so that timestamps strictly increase.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }
}

/// [`ChatStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryChatStore {
    state: RwLock<State>,
}

impl MemoryChatStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user. Fails if the username is taken.
    pub async fn add_user(&self, user: User) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.username) {
            return Err(AppError::conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        state.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    /// Every stored message, in persist order.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }

    /// Every stored notification, in persist order.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn find_user(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(username).cloned())
    }

    async fn create_message(
        &self,
        sender: UserId,
        receiver: UserId,
        content: &str,
    ) -> AppResult<Message> {
        if content.is_empty() {
            return Err(AppError::validation("Message content must not be empty"));
        }
        let mut state = self.state.write().await;
        let message = Message {
            id: MessageId::new(),
            sender_id: sender,
            receiver_id: receiver,
            content: content.to_string(),
            timestamp: state.next_timestamp(),
            is_read: false,
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn mark_read(&self, sender: UserId, receiver: UserId) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut changed = 0;
        for message in state
            .messages
            .iter_mut()
            .filter(|m| m.sender_id == sender && m.receiver_id == receiver && !m.is_read)
        {
            message.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn unread_message_count(&self, user: UserId) -> AppResult<i64> {
        let state = self.state.read().await;
        let count = state
            .messages
            .iter()
            .filter(|m| m.receiver_id == user && !m.is_read)
            .count();
        Ok(count as i64)
    }

    async fn unread_notification_count(&self, user: UserId) -> AppResult<i64> {
        let state = self.state.read().await;
        let count = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user && !n.is_read)
            .count();
        Ok(count as i64)
    }

    async fn create_notification(&self, draft: &NewNotification) -> AppResult<Notification> {
        let mut state = self.state.write().await;
        let notification = Notification {
            id: NotificationId::new(),
            user_id: draft.user_id,
            created_by: draft.created_by,
            kind: draft.kind,
            post_id: draft.post_id,
            comment_id: draft.comment_id,
            created_at: state.next_timestamp(),
            is_read: false,
        };
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn mark_notifications_read(&self, user: UserId) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut changed = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use social_entity::notification::NotificationKind;

    use super::*;

    async fn seeded() -> (MemoryChatStore, User, User) {
        let store = MemoryChatStore::new();
        let alice = store
            .add_user(User::new("alice", "Alice", "alice@example.com"))
            .await
            .unwrap();
        let bob = store
            .add_user(User::new("bob", "Bob", "bob@example.com"))
            .await
            .unwrap();
        (store, alice, bob)
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (store, _, _) = seeded().await;
        let err = store
            .add_user(User::new("alice", "Other", "other@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, social_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_timestamps_strictly_increase() {
        let (store, alice, bob) = seeded().await;
        let mut last = None;
        for i in 0..100 {
            let message = store
                .create_message(alice.id, bob.id, &format!("m{i}"))
                .await
                .unwrap();
            if let Some(prev) = last {
                assert!(message.timestamp > prev);
            }
            last = Some(message.timestamp);
        }
    }

    #[tokio::test]
    async fn test_mark_read_only_touches_pair() {
        let (store, alice, bob) = seeded().await;
        let carol = store
            .add_user(User::new("carol", "Carol", "carol@example.com"))
            .await
            .unwrap();

        store.create_message(alice.id, bob.id, "one").await.unwrap();
        store.create_message(alice.id, bob.id, "two").await.unwrap();
        store.create_message(carol.id, bob.id, "three").await.unwrap();
        store.create_message(bob.id, alice.id, "four").await.unwrap();

        assert_eq!(store.unread_message_count(bob.id).await.unwrap(), 3);
        assert_eq!(store.mark_read(alice.id, bob.id).await.unwrap(), 2);
        assert_eq!(store.mark_read(alice.id, bob.id).await.unwrap(), 0);
        assert_eq!(store.unread_message_count(bob.id).await.unwrap(), 1);
        assert_eq!(store.unread_message_count(alice.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_notification_counts() {
        let (store, alice, bob) = seeded().await;
        let draft = NewNotification {
            user_id: bob.id,
            created_by: alice.id,
            kind: NotificationKind::Like,
            post_id: None,
            comment_id: None,
        };
        store.create_notification(&draft).await.unwrap();
        store.create_notification(&draft).await.unwrap();

        assert_eq!(store.unread_notification_count(bob.id).await.unwrap(), 2);
        assert_eq!(store.mark_notifications_read(bob.id).await.unwrap(), 2);
        assert_eq!(store.unread_notification_count(bob.id).await.unwrap(), 0);
        assert_eq!(store.unread_notification_count(alice.id).await.unwrap(), 0);
    }
}
