//! Integration tests for socket upgrades and live delivery.

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use social_realtime::GroupLabel;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn connect(addr: SocketAddr, path: &str, token: &str) -> Socket {
    let url = format!("ws://{addr}{path}?token={token}");
    let (socket, _) = connect_async(url).await.expect("Failed to connect");
    socket
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(WAIT, socket.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Socket closed")
            .expect("Socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
        }
    }
}

async fn wait_for_members(app: &helpers::TestApp, label: &GroupLabel, expected: usize) {
    tokio::time::timeout(WAIT, async {
        while app.engine.registry.members_of(label).len() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Group never reached the expected size");
}

#[tokio::test]
async fn test_ws_upgrade_without_token() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/ws/chat/bob", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.request("GET", "/ws/notifications", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ws_upgrade_with_bad_token() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", "/ws/notifications?token=garbage", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.engine.registry.connection_count(), 0);
}

#[tokio::test]
async fn test_chat_round_trip() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn_server().await;

    let mut alice = connect(addr, "/ws/chat/bob", &app.token("alice").await).await;
    let mut bob = connect(addr, "/ws/chat/alice", &app.token("bob").await).await;
    wait_for_members(&app, &GroupLabel::room("alice", "bob"), 2).await;

    alice
        .send(Message::text(json!({ "message": "hi bob" }).to_string()))
        .await
        .expect("send");

    for socket in [&mut alice, &mut bob] {
        let frame = next_json(socket).await;
        assert_eq!(frame["type"], "chat.message");
        assert_eq!(frame["message"], "hi bob");
        assert_eq!(frame["sender"], "alice");
        assert!(frame["timestamp"].is_string());
    }

    assert_eq!(app.store.messages().await.len(), 1);
}

#[tokio::test]
async fn test_malformed_frame_gets_error_and_connection_survives() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn_server().await;

    let mut alice = connect(addr, "/ws/chat/bob", &app.token("alice").await).await;
    wait_for_members(&app, &GroupLabel::room("alice", "bob"), 1).await;

    alice.send(Message::text("not json")).await.expect("send");
    let frame = next_json(&mut alice).await;
    assert_eq!(frame, json!({ "type": "error", "message": "Invalid data format." }));

    alice
        .send(Message::text(json!({ "message": "still here" }).to_string()))
        .await
        .expect("send");
    let frame = next_json(&mut alice).await;
    assert_eq!(frame["message"], "still here");
}

#[tokio::test]
async fn test_chat_pushes_unread_count_to_receiver() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn_server().await;
    let bob_id = app.user("bob").await.id;

    let mut bob_feed = connect(addr, "/ws/notifications", &app.token("bob").await).await;
    wait_for_members(&app, &GroupLabel::user(bob_id), 1).await;

    let mut alice = connect(addr, "/ws/chat/bob", &app.token("alice").await).await;
    wait_for_members(&app, &GroupLabel::room("alice", "bob"), 1).await;

    alice
        .send(Message::text(json!({ "message": "ping" }).to_string()))
        .await
        .expect("send");

    let frame = next_json(&mut bob_feed).await;
    assert_eq!(frame, json!({ "type": "unread_message_update", "count": 1 }));
}

#[tokio::test]
async fn test_notification_write_path_pushes_count() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn_server().await;
    let bob_id = app.user("bob").await.id;

    let mut bob_feed = connect(addr, "/ws/notifications", &app.token("bob").await).await;
    wait_for_members(&app, &GroupLabel::user(bob_id), 1).await;

    let alice_token = app.token("alice").await;
    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({ "recipient": "bob", "kind": "like" })),
            Some(&alice_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let frame = next_json(&mut bob_feed).await;
    assert_eq!(
        frame,
        json!({ "type": "unread_notification_update", "count": 1 })
    );
}

#[tokio::test]
async fn test_disconnect_leaves_group() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn_server().await;
    let room = GroupLabel::room("alice", "bob");

    let alice = connect(addr, "/ws/chat/bob", &app.token("alice").await).await;
    wait_for_members(&app, &room, 1).await;

    drop(alice);
    wait_for_members(&app, &room, 0).await;

    tokio::time::timeout(WAIT, async {
        while app.engine.registry.connection_count() != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Connection was never released");
}
