//! Reverse index: which groups each connection belongs to.

use std::collections::HashSet;

use dashmap::DashMap;

use social_core::types::id::ConnectionId;

use super::label::{GroupKind, GroupLabel};

/// Tracks connection-to-group memberships.
#[derive(Debug, Default)]
pub struct MembershipTracker {
    conn_to_groups: DashMap<ConnectionId, HashSet<GroupLabel>>,
}

impl MembershipTracker {
    /// Creates a new membership tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Group of the given kind the connection already belongs to, if any.
    pub fn find_kind(&self, conn_id: ConnectionId, kind: GroupKind) -> Option<GroupLabel> {
        self.conn_to_groups.get(&conn_id).and_then(|groups| {
            groups
                .iter()
                .find(|label| label.kind() == kind)
                .cloned()
        })
    }

    /// Records a membership.
    pub fn add(&self, conn_id: ConnectionId, label: GroupLabel) {
        self.conn_to_groups.entry(conn_id).or_default().insert(label);
    }

    /// Removes a membership.
    pub fn remove(&self, conn_id: ConnectionId, label: &GroupLabel) {
        if let Some(mut groups) = self.conn_to_groups.get_mut(&conn_id) {
            groups.remove(label);
            if groups.is_empty() {
                drop(groups);
                self.conn_to_groups
                    .remove_if(&conn_id, |_, groups| groups.is_empty());
            }
        }
    }

    /// Gets all groups a connection belongs to.
    pub fn groups_of(&self, conn_id: ConnectionId) -> HashSet<GroupLabel> {
        self.conn_to_groups
            .get(&conn_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}
