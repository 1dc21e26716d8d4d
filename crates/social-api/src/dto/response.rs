//! Response DTOs.

use serde::{Deserialize, Serialize};

use social_entity::notification::Notification;
use social_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Unread counters shown in the navigation bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountsResponse {
    pub unread_message_count: i64,
    pub unread_notification_count: i64,
}

/// Outcome of `POST /api/notifications`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationResponse {
    /// False when the actor is the recipient.
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

/// Outcome of a bulk mark-read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkedResponse {
    /// Rows changed.
    pub marked: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: i64,
}

/// Detailed health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// `connected`, `unreachable`, or `memory`.
    pub database: String,
    /// Open socket connections.
    pub ws_connections: usize,
    /// Groups with at least one member.
    pub groups: usize,
    /// Broker counters.
    pub realtime: MetricsSnapshot,
}
