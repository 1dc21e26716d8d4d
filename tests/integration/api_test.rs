//! Integration tests for the REST surface.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use social_entity::notification::{NewNotification, NotificationKind};
use social_realtime::ChatStore;

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_detailed_health_reports_memory_store() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/health/detailed", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["database"], "memory");
    assert_eq!(response.body["data"]["ws_connections"], 0);
    assert_eq!(response.body["data"]["realtime"]["connections_total"], 0);
}

#[tokio::test]
async fn test_unread_counts_require_token() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/unread-counts", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unread_counts_reject_bad_token() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request("GET", "/api/unread-counts", None, Some("not-a-jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unread_counts_reflect_store() {
    let app = helpers::TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    app.store
        .create_message(alice.id, bob.id, "hi")
        .await
        .expect("message");
    app.store
        .create_message(alice.id, bob.id, "still there?")
        .await
        .expect("message");
    app.store
        .create_notification(&NewNotification {
            user_id: bob.id,
            created_by: alice.id,
            kind: NotificationKind::Like,
            post_id: None,
            comment_id: None,
        })
        .await
        .expect("notification");

    let token = app.token("bob").await;
    let response = app
        .request("GET", "/api/unread-counts", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["unread_message_count"], 2);
    assert_eq!(response.body["data"]["unread_notification_count"], 1);
}

#[tokio::test]
async fn test_create_notification() {
    let app = helpers::TestApp::new().await;
    let token = app.token("alice").await;

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({ "recipient": "bob", "kind": "comment" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["created"], true);
    assert_eq!(response.body["data"]["notification"]["kind"], "comment");

    let bob = app.user("bob").await;
    assert_eq!(app.store.unread_notification_count(bob.id).await.expect("count"), 1);
}

#[tokio::test]
async fn test_self_notification_is_skipped() {
    let app = helpers::TestApp::new().await;
    let token = app.token("alice").await;

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({ "recipient": "alice", "kind": "like" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["created"], false);
    assert!(app.store.notifications().await.is_empty());
}

#[tokio::test]
async fn test_create_notification_unknown_recipient() {
    let app = helpers::TestApp::new().await;
    let token = app.token("alice").await;

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({ "recipient": "mallory", "kind": "like" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_notification_validates_recipient() {
    let app = helpers::TestApp::new().await;
    let token = app.token("alice").await;

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({ "recipient": "", "kind": "like" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_mark_all_read() {
    let app = helpers::TestApp::new().await;
    let alice_token = app.token("alice").await;
    let bob_token = app.token("bob").await;

    for kind in ["like", "comment"] {
        let response = app
            .request(
                "POST",
                "/api/notifications",
                Some(json!({ "recipient": "bob", "kind": kind })),
                Some(&alice_token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let response = app
        .request("PUT", "/api/notifications/read-all", None, Some(&bob_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["marked"], 2);

    let response = app
        .request("GET", "/api/unread-counts", None, Some(&bob_token))
        .await;
    assert_eq!(response.body["data"]["unread_notification_count"], 0);
}
