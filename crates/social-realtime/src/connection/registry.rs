//! Registry of live connections and their group memberships.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use social_core::types::id::ConnectionId;
use social_core::types::principal::Principal;

use crate::channel::group::Group;
use crate::channel::label::GroupLabel;
use crate::channel::subscription::MembershipTracker;
use crate::error::RealtimeError;
use crate::message::types::GroupEvent;

use super::handle::ConnectionHandle;
use super::membership::MembershipGuard;

/// Owns every open connection and the member set of every group.
///
/// Member sets live inside a `DashMap` shard; `admit`, `dismiss` and
/// `members_of` each hold the shard lock for the whole operation, so a
/// snapshot never observes a half-applied change.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    groups: DashMap<GroupLabel, Group>,
    memberships: MembershipTracker,
    inbox_buffer: usize,
}

impl ConnectionRegistry {
    /// Creates an empty registry whose connections get inboxes of
    /// `inbox_buffer` events.
    pub fn new(inbox_buffer: usize) -> Self {
        Self {
            connections: DashMap::new(),
            groups: DashMap::new(),
            memberships: MembershipTracker::new(),
            inbox_buffer: inbox_buffer.max(1),
        }
    }

    /// Registers a new connection and returns its handle and inbox.
    pub fn open(
        &self,
        principal: Option<Principal>,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<GroupEvent>) {
        let (tx, rx) = mpsc::channel(self.inbox_buffer);
        let handle = Arc::new(ConnectionHandle::new(principal, tx));
        self.connections.insert(handle.id, Arc::clone(&handle));

        debug!(
            conn_id = %handle.id,
            user = handle.principal.as_ref().map(|p| p.username.as_str()).unwrap_or("-"),
            "Connection opened"
        );
        (handle, rx)
    }

    /// Adds a connection to a group. Idempotent.
    ///
    /// Returns the group's ordering lock. Fails with `AuthRequired` for an
    /// anonymous connection and with `MembershipConflict` when the
    /// connection already belongs to another group of the same kind.
    pub fn admit(
        &self,
        handle: &Arc<ConnectionHandle>,
        label: &GroupLabel,
    ) -> Result<Arc<Mutex<()>>, RealtimeError> {
        handle.principal()?;

        if let Some(existing) = self.memberships.find_kind(handle.id, label.kind()) {
            if &existing != label {
                return Err(RealtimeError::MembershipConflict {
                    conn_id: handle.id,
                    existing: existing.to_string(),
                });
            }
        }

        let mut group = self.groups.entry(label.clone()).or_default();
        if group.insert(Arc::clone(handle)) {
            self.memberships.add(handle.id, label.clone());
            debug!(conn_id = %handle.id, group = %label, members = group.len(), "Admitted");
        }
        Ok(group.sequencer())
    }

    /// Admits and returns a guard that dismisses on drop.
    pub fn join(
        self: &Arc<Self>,
        handle: &Arc<ConnectionHandle>,
        label: GroupLabel,
    ) -> Result<MembershipGuard, RealtimeError> {
        let sequencer = self.admit(handle, &label)?;
        Ok(MembershipGuard::new(
            Arc::clone(self),
            handle.id,
            label,
            sequencer,
        ))
    }

    /// Removes a connection from a group. No-op if it is not a member.
    pub fn dismiss(&self, conn_id: ConnectionId, label: &GroupLabel) {
        let removed = match self.groups.get_mut(label) {
            Some(mut group) => group.remove(&conn_id),
            None => false,
        };
        // Keep the entry while someone still holds its ordering lock.
        self.groups.remove_if(label, |_, group| group.is_reclaimable());

        if removed {
            self.memberships.remove(conn_id, label);
            debug!(conn_id = %conn_id, group = %label, "Dismissed");
        }
    }

    /// Snapshot of a group's current members.
    pub fn members_of(&self, label: &GroupLabel) -> Vec<Arc<ConnectionHandle>> {
        self.groups
            .get(label)
            .map(|group| group.snapshot())
            .unwrap_or_default()
    }

    /// Whether `conn_id` is currently a member of `label`.
    pub fn is_member(&self, conn_id: ConnectionId, label: &GroupLabel) -> bool {
        self.groups
            .get(label)
            .is_some_and(|group| group.contains(&conn_id))
    }

    /// Dismisses a connection from every group and forgets it.
    pub fn close(&self, conn_id: ConnectionId) {
        for label in self.memberships.groups_of(conn_id) {
            self.dismiss(conn_id, &label);
        }
        if let Some((_, handle)) = self.connections.remove(&conn_id) {
            handle.mark_closed();
            debug!(conn_id = %conn_id, "Connection closed");
        }
    }

    /// Closes every connection. Used at shutdown.
    pub fn close_all(&self) {
        let ids: Vec<ConnectionId> = self.connections.iter().map(|e| *e.key()).collect();
        let count = ids.len();
        for conn_id in ids {
            self.close(conn_id);
        }
        info!(count, "All connections closed");
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of groups with at least one member.
    pub fn group_count(&self) -> usize {
        self.groups.iter().filter(|g| !g.is_empty()).count()
    }

    /// Groups a connection currently belongs to.
    pub fn groups_of(&self, conn_id: ConnectionId) -> HashSet<GroupLabel> {
        self.memberships.groups_of(conn_id)
    }
}

#[cfg(test)]
mod tests {
    use social_core::types::id::UserId;

    use super::*;

    fn registry() -> Arc<ConnectionRegistry> {
        Arc::new(ConnectionRegistry::new(8))
    }

    fn open(registry: &ConnectionRegistry, name: &str) -> Arc<ConnectionHandle> {
        registry.open(Some(Principal::new(UserId::new(), name))).0
    }

    #[test]
    fn test_admit_is_idempotent() {
        let registry = registry();
        let alice = open(&registry, "alice");
        let room = GroupLabel::room("alice", "bob");

        registry.admit(&alice, &room).unwrap();
        registry.admit(&alice, &room).unwrap();

        assert_eq!(registry.members_of(&room).len(), 1);
        assert_eq!(registry.groups_of(alice.id).len(), 1);
    }

    #[test]
    fn test_admit_requires_principal() {
        let registry = registry();
        let (anon, _rx) = registry.open(None);
        let err = registry
            .admit(&anon, &GroupLabel::room("a", "b"))
            .unwrap_err();
        assert!(matches!(err, RealtimeError::AuthRequired));
        assert_eq!(registry.group_count(), 0);
    }

    #[test]
    fn test_one_group_per_kind() {
        let registry = registry();
        let alice = open(&registry, "alice");

        registry.admit(&alice, &GroupLabel::room("alice", "bob")).unwrap();
        let err = registry
            .admit(&alice, &GroupLabel::room("alice", "carol"))
            .unwrap_err();
        assert!(matches!(err, RealtimeError::MembershipConflict { .. }));

        // A personal group is a different kind and is allowed.
        let own = GroupLabel::user(alice.principal().unwrap().user_id);
        registry.admit(&alice, &own).unwrap();
        assert_eq!(registry.groups_of(alice.id).len(), 2);
    }

    #[test]
    fn test_dismiss_absent_is_noop() {
        let registry = registry();
        let alice = open(&registry, "alice");
        let room = GroupLabel::room("alice", "bob");

        registry.dismiss(alice.id, &room);
        registry.admit(&alice, &room).unwrap();
        registry.dismiss(alice.id, &room);
        registry.dismiss(alice.id, &room);

        assert!(registry.members_of(&room).is_empty());
        assert_eq!(registry.group_count(), 0);
    }

    #[test]
    fn test_guard_dismisses_on_drop() {
        let registry = registry();
        let alice = open(&registry, "alice");
        let room = GroupLabel::room("alice", "bob");

        {
            let _guard = registry.join(&alice, room.clone()).unwrap();
            assert!(registry.is_member(alice.id, &room));
        }
        assert!(!registry.is_member(alice.id, &room));
        assert!(registry.groups_of(alice.id).is_empty());
    }

    #[test]
    fn test_sequencer_is_shared_per_group() {
        let registry = registry();
        let alice = open(&registry, "alice");
        let bob = open(&registry, "bob");
        let room = GroupLabel::room("alice", "bob");

        let a = registry.join(&alice, room.clone()).unwrap();
        let b = registry.join(&bob, room.clone()).unwrap();
        assert!(Arc::ptr_eq(&a.sequencer(), &b.sequencer()));
    }

    #[test]
    fn test_close_leaves_no_membership() {
        let registry = registry();
        let alice = open(&registry, "alice");
        let room = GroupLabel::room("alice", "bob");
        let own = GroupLabel::user(alice.principal().unwrap().user_id);

        registry.admit(&alice, &room).unwrap();
        registry.admit(&alice, &own).unwrap();
        registry.close(alice.id);

        assert!(registry.members_of(&room).is_empty());
        assert!(registry.members_of(&own).is_empty());
        assert_eq!(registry.connection_count(), 0);
        assert!(!alice.is_alive());
    }

    #[tokio::test]
    async fn test_concurrent_admit_and_dismiss() {
        let registry = registry();
        let room = GroupLabel::room("alice", "bob");
        let handles: Vec<_> = (0..64)
            .map(|i| open(&registry, &format!("user{i}")))
            .collect();

        let tasks: Vec<_> = handles
            .iter()
            .cloned()
            .map(|handle| {
                let registry = Arc::clone(&registry);
                let room = room.clone();
                tokio::spawn(async move {
                    registry.admit(&handle, &room).unwrap();
                    tokio::task::yield_now().await;
                    if handle.principal().unwrap().username.ends_with('0') {
                        registry.dismiss(handle.id, &room);
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let expected = handles
            .iter()
            .filter(|h| !h.principal().unwrap().username.ends_with('0'))
            .count();
        assert_eq!(registry.members_of(&room).len(), expected);
    }
}
