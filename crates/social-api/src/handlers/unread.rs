//! Unread counters for the navigation bar.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, UnreadCountsResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/unread-counts
pub async fn unread_counts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UnreadCountsResponse>>, ApiError> {
    let store = &state.realtime.store;
    let unread_message_count = store.unread_message_count(auth.user_id).await?;
    let unread_notification_count = store.unread_notification_count(auth.user_id).await?;

    Ok(Json(ApiResponse::ok(UnreadCountsResponse {
        unread_message_count,
        unread_notification_count,
    })))
}
