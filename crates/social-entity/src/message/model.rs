//! Direct message entity model.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use social_core::types::id::{MessageId, UserId};

/// A 1:1 message between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Author of the message.
    pub sender_id: UserId,
    /// Addressee of the message.
    pub receiver_id: UserId,
    /// Message body, never empty.
    pub content: String,
    /// Server-assigned persist time.
    pub timestamp: DateTime<Utc>,
    /// Whether the receiver has opened the conversation since.
    pub is_read: bool,
}

impl Message {
    /// Returns the timestamp in ISO-8601 form with microsecond precision
    /// and an explicit `+00:00` offset.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, false)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_timestamp_iso_uses_offset_form() {
        let message = Message {
            id: MessageId::new(),
            sender_id: UserId::new(),
            receiver_id: UserId::new(),
            content: "hi".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap(),
            is_read: false,
        };
        assert_eq!(message.timestamp_iso(), "2024-03-01T12:30:05.000000+00:00");
    }
}
