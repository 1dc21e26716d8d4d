//! # social-api
//!
//! HTTP layer of the social platform built on Axum.
//!
//! Serves the chat and notification socket upgrades, the unread-counter
//! and notification endpoints that feed the realtime broker, health
//! checks, and the error mapping shared by every handler.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
