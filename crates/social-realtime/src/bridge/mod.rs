//! Bridges the HTTP write path into the realtime fan-out.

pub mod event_bridge;

pub use event_bridge::EventBridge;
