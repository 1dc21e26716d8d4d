//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use social_api::{AppState, build_router};
use social_auth::jwt::{JwtDecoder, JwtEncoder};
use social_core::config::AppConfig;
use social_core::types::principal::Principal;
use social_entity::user::User;
use social_realtime::{ChatStore, MemoryChatStore, RealtimeEngine};

/// Test application context backed by the in-memory store.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The realtime engine behind the router
    pub engine: Arc<RealtimeEngine>,
    /// Direct access to stored rows
    pub store: Arc<MemoryChatStore>,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
}

impl TestApp {
    /// Create a new test application with the users `alice`, `bob` and `carol`.
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.url = "memory".to_string();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.realtime.ping_interval_seconds = 0;

        let store = Arc::new(MemoryChatStore::new());
        for name in ["alice", "bob", "carol"] {
            store
                .add_user(User::new(name, name, format!("{name}@example.com")))
                .await
                .expect("Failed to seed user");
        }

        let engine = Arc::new(RealtimeEngine::new(
            config.realtime.clone(),
            Arc::clone(&store) as Arc<dyn ChatStore>,
        ));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let encoder = JwtEncoder::new(&config.auth);

        let state = AppState::new(config.clone(), None, jwt_decoder, Arc::clone(&engine));
        let router = build_router(state);

        Self {
            router,
            engine,
            store,
            config,
            encoder,
        }
    }

    /// Issue an access token for a seeded user.
    pub async fn token(&self, username: &str) -> String {
        let user = self.user(username).await;
        let (token, _) = self
            .encoder
            .issue(&Principal::new(user.id, user.username))
            .expect("Failed to issue token");
        token
    }

    /// Look up a seeded user.
    pub async fn user(&self, username: &str) -> User {
        self.store
            .find_user(username)
            .await
            .expect("store")
            .expect("user should be seeded")
    }

    /// Serve the router on an ephemeral local port.
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server");
        });
        addr
    }

    /// Make an HTTP request to the test server
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Simplified test response
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON
    pub body: Value,
}
