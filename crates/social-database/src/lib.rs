//! # social-database
//!
//! PostgreSQL database connection management and concrete repository
//! implementations for users, direct messages, and notifications.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
