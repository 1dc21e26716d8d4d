//! Route definitions for the social broker.
//!
//! REST endpoints live under `/api`, socket endpoints under `/ws`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(unread_routes())
        .merge(notification_routes());

    let ws_routes = Router::new()
        .route("/chat/{username}", get(handlers::ws::chat_ws))
        .route("/notifications", get(handlers::ws::notifications_ws));

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .nest("/ws", ws_routes)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

fn unread_routes() -> Router<AppState> {
    Router::new().route("/unread-counts", get(handlers::unread::unread_counts))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            post(handlers::notification::create_notification),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
}
