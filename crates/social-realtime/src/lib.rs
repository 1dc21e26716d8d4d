//! # social-realtime
//!
//! Real-time broker for direct messages and unread counters. Provides:
//!
//! - A connection registry with per-room and per-user broadcast groups
//! - Group fan-out with isolated per-member delivery
//! - Chat sessions (1:1 rooms keyed by both usernames)
//! - Notification sessions pushing unread-count snapshots
//! - A storage seam with PostgreSQL and in-memory implementations

pub mod bridge;
pub mod broadcast;
pub mod channel;
pub mod connection;
pub mod error;
pub mod message;
pub mod metrics;
pub mod server;
pub mod session;
pub mod store;

pub use bridge::EventBridge;
pub use broadcast::GroupBroadcaster;
pub use channel::label::{GroupLabel, room_key};
pub use connection::registry::ConnectionRegistry;
pub use error::RealtimeError;
pub use server::RealtimeEngine;
pub use session::{
    ChatSession, Inbox, NotificationSession, RealtimeSession, SessionState, drive,
};
pub use store::{ChatStore, MemoryChatStore, PgChatStore};
