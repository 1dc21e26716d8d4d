//! Request handlers.

pub mod health;
pub mod notification;
pub mod unread;
pub mod ws;
