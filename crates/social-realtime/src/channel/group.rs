//! Single broadcast group with member tracking.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use social_core::types::id::ConnectionId;

use crate::connection::handle::ConnectionHandle;

/// Members of one group, plus the lock that orders publishes into it.
#[derive(Debug)]
pub struct Group {
    members: HashMap<ConnectionId, Arc<ConnectionHandle>>,
    sequencer: Arc<Mutex<()>>,
}

impl Group {
    /// Creates a new empty group.
    pub fn new() -> Self {
        Self {
            members: HashMap::new(),
            sequencer: Arc::new(Mutex::new(())),
        }
    }

    /// Adds a member. Returns `false` if it was already present.
    pub fn insert(&mut self, handle: Arc<ConnectionHandle>) -> bool {
        self.members.insert(handle.id, handle).is_none()
    }

    /// Removes a member. Returns `false` if it was absent.
    pub fn remove(&mut self, conn_id: &ConnectionId) -> bool {
        self.members.remove(conn_id).is_some()
    }

    /// Whether `conn_id` is a member.
    pub fn contains(&self, conn_id: &ConnectionId) -> bool {
        self.members.contains_key(conn_id)
    }

    /// Returns member count.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the group has any members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Empty and nobody outside the group holds its ordering lock.
    pub fn is_reclaimable(&self) -> bool {
        self.members.is_empty() && Arc::strong_count(&self.sequencer) == 1
    }

    /// Copy of the current members.
    pub fn snapshot(&self) -> Vec<Arc<ConnectionHandle>> {
        self.members.values().cloned().collect()
    }

    /// Lock held across "persist then publish" so that deliveries follow
    /// persisted order.
    pub fn sequencer(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.sequencer)
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}
