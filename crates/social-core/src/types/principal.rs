//! The authenticated identity bound to a request or connection.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Authenticated user, produced by the auth layer and handed to sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub user_id: UserId,
    /// Username, the key used for room naming.
    pub username: String,
}

impl Principal {
    /// Creates a principal.
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}
