//! Scoped group membership.

use std::sync::Arc;

use tokio::sync::Mutex;

use social_core::types::id::ConnectionId;

use crate::channel::label::GroupLabel;

use super::registry::ConnectionRegistry;

/// Membership that ends when the guard is dropped.
///
/// Sessions hold one guard per joined group, so every exit path out of a
/// session task (return, `?`, panic unwind, task abort) dismisses the
/// connection from the group.
#[derive(Debug)]
pub struct MembershipGuard {
    registry: Arc<ConnectionRegistry>,
    conn_id: ConnectionId,
    label: GroupLabel,
    sequencer: Option<Arc<Mutex<()>>>,
}

impl MembershipGuard {
    pub(crate) fn new(
        registry: Arc<ConnectionRegistry>,
        conn_id: ConnectionId,
        label: GroupLabel,
        sequencer: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            registry,
            conn_id,
            label,
            sequencer: Some(sequencer),
        }
    }

    /// The joined group.
    pub fn label(&self) -> &GroupLabel {
        &self.label
    }

    /// Ordering lock of the joined group.
    pub fn sequencer(&self) -> Arc<Mutex<()>> {
        match &self.sequencer {
            Some(lock) => Arc::clone(lock),
            None => Arc::new(Mutex::new(())),
        }
    }
}

impl Drop for MembershipGuard {
    fn drop(&mut self) {
        // Release our lock reference first so the registry can reclaim an
        // emptied group.
        self.sequencer.take();
        self.registry.dismiss(self.conn_id, &self.label);
    }
}
