//! Application state shared across all handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use social_auth::jwt::JwtDecoder;
use social_core::config::AppConfig;
use social_database::DatabasePool;
use social_realtime::RealtimeEngine;
use social_realtime::connection::WsAuthenticator;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL pool, absent when the in-memory store is used
    pub db_pool: Option<DatabasePool>,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Socket upgrade authenticator
    pub ws_authenticator: WsAuthenticator,
    /// Realtime broker
    pub realtime: Arc<RealtimeEngine>,
    /// Process start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Assembles the state.
    pub fn new(
        config: AppConfig,
        db_pool: Option<DatabasePool>,
        jwt_decoder: Arc<JwtDecoder>,
        realtime: Arc<RealtimeEngine>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            db_pool,
            ws_authenticator: WsAuthenticator::new(Arc::clone(&jwt_decoder)),
            jwt_decoder,
            realtime,
            started_at: Utc::now(),
        }
    }
}
