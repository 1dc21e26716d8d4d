//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use social_core::types::id::UserId;

/// A registered member of the network.
///
/// Only the columns the realtime layer reads are mapped here; profile
/// fields are owned by the profile pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name. Rooms are keyed by it.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds an in-memory user record with a fresh identifier.
    pub fn new(username: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            name: name.into(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }
}
