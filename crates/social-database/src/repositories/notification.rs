//! Notification repository implementation.

use sqlx::PgPool;

use social_core::error::{AppError, ErrorKind};
use social_core::result::AppResult;
use social_core::types::id::{NotificationId, UserId};
use social_entity::notification::{NewNotification, Notification};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, created_by, kind, post_id, comment_id, created_at, is_read";

/// Persistence for like/comment notifications.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a notification.
    pub async fn create(&self, draft: &NewNotification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (id, user_id, created_by, kind, post_id, comment_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(NotificationId::new())
        .bind(draft.user_id)
        .bind(draft.created_by)
        .bind(draft.kind)
        .bind(draft.post_id)
        .bind(draft.comment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: UserId) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }
}
