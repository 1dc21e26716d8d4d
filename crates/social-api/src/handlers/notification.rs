//! Notification write path.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use social_core::error::AppError;
use social_entity::notification::NewNotification;

use crate::dto::request::CreateNotificationRequest;
use crate::dto::response::{ApiResponse, CreateNotificationResponse, MarkedResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/notifications
pub async fn create_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateNotificationResponse>>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let recipient = state
        .realtime
        .store
        .find_user(&req.recipient)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{}' not found", req.recipient)))?;

    let draft = NewNotification {
        user_id: recipient.id,
        created_by: auth.user_id,
        kind: req.kind,
        post_id: req.post_id,
        comment_id: req.comment_id,
    };
    let notification = state.realtime.event_bridge.on_notification_created(draft).await?;

    let status = if notification.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ApiResponse::ok(CreateNotificationResponse {
            created: notification.is_some(),
            notification,
        })),
    ))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MarkedResponse>>, ApiError> {
    let marked = state
        .realtime
        .event_bridge
        .on_notifications_read(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(MarkedResponse { marked })))
}
