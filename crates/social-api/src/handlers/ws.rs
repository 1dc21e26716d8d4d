//! Socket upgrade handlers.

use std::future;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, interval_at, timeout};
use tracing::{debug, info, warn};

use social_realtime::message::types::GroupEvent;
use social_realtime::{RealtimeSession, drive};

use crate::extractors::WsAuth;
use crate::state::AppState;

const WRITER_GRACE: Duration = Duration::from_secs(5);

/// GET /ws/chat/{username}
pub async fn chat_ws(
    State(state): State<AppState>,
    WsAuth(principal): WsAuth,
    Path(username): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        let (session, events) = state.realtime.chat_session(principal, &username);
        serve_socket(state, session, events, socket).await;
    })
}

/// GET /ws/notifications
pub async fn notifications_ws(
    State(state): State<AppState>,
    WsAuth(principal): WsAuth,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        let (session, events) = state.realtime.notification_session(principal);
        serve_socket(state, session, events, socket).await;
    })
}

/// Pumps one established socket through a session.
async fn serve_socket<S>(
    state: AppState,
    session: S,
    events: mpsc::Receiver<GroupEvent>,
    socket: WebSocket,
) where
    S: RealtimeSession + 'static,
{
    let conn_id = session.connection_id();
    let config = state.realtime.config();
    let (mut ws_tx, ws_rx) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(config.outbound_buffer_size.max(1));

    info!(conn_id = %conn_id, "WebSocket connection established");

    let mut ping = ping_interval(config.ping_interval_seconds);
    let mut writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                frame = outbound_rx.recv() => {
                    let Some(text) = frame else { break };
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = next_ping(&mut ping) => {
                    if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    let inbound = ws_rx
        .inspect(move |msg| {
            if let Err(e) = msg {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
            }
        })
        .take_while(|msg| future::ready(matches!(msg, Ok(m) if !matches!(m, Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(text.as_str().to_owned()),
                _ => None,
            })
        })
        .boxed();

    let result = drive(
        session,
        inbound,
        events,
        outbound_tx,
        state.realtime.shutdown_receiver(),
    )
    .await;

    if timeout(WRITER_GRACE, &mut writer).await.is_err() {
        debug!(conn_id = %conn_id, "Writer did not drain in time");
        writer.abort();
    }

    info!(conn_id = %conn_id, clean = result.is_ok(), "WebSocket connection closed");
}

fn ping_interval(seconds: u64) -> Option<Interval> {
    (seconds > 0).then(|| {
        let period = Duration::from_secs(seconds);
        interval_at(Instant::now() + period, period)
    })
}

async fn next_ping(ping: &mut Option<Interval>) {
    match ping {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}
