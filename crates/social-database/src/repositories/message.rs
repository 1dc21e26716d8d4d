//! Direct message repository implementation.

use sqlx::PgPool;

use social_core::error::{AppError, ErrorKind};
use social_core::result::AppResult;
use social_core::types::id::{MessageId, UserId};
use social_entity::message::Message;

/// Persistence for 1:1 messages.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a message; the database assigns `timestamp`.
    pub async fn create(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: &str,
    ) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, sender_id, receiver_id, content) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, sender_id, receiver_id, content, timestamp, is_read",
        )
        .bind(MessageId::new())
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))
    }

    /// Mark every unread message from `sender_id` to `receiver_id` as read.
    pub async fn mark_read(&self, sender_id: UserId, receiver_id: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE \
             WHERE sender_id = $1 AND receiver_id = $2 AND is_read = FALSE",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark messages read", e))?;
        Ok(result.rows_affected())
    }

    /// Count unread messages addressed to a user.
    pub async fn count_unread(&self, receiver_id: UserId) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND is_read = FALSE",
        )
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread messages", e))
    }
}
