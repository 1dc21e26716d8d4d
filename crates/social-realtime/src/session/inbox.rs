//! Group-event inbox of one session.

use std::collections::VecDeque;

use tokio::sync::{Mutex, MutexGuard, mpsc};

use crate::message::types::GroupEvent;

/// A connection's group events, plus those set aside while the session
/// waited on a room's ordering lock.
///
/// The lock holder publishes into every member's inbox, waiters included,
/// so a waiter must keep accepting deliveries until it gets the lock.
#[derive(Debug)]
pub struct Inbox {
    events: mpsc::Receiver<GroupEvent>,
    backlog: VecDeque<GroupEvent>,
}

impl Inbox {
    pub fn new(events: mpsc::Receiver<GroupEvent>) -> Self {
        Self {
            events,
            backlog: VecDeque::new(),
        }
    }

    /// Next event, set-aside events first. `None` once the connection's
    /// sender side is gone and nothing is left.
    pub async fn recv(&mut self) -> Option<GroupEvent> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }
        self.events.recv().await
    }

    /// Events received but not yet handed to the session.
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Acquires `lock` while draining incoming events into the backlog.
    ///
    /// On return the channel is empty: while the lock is held nobody else
    /// publishes into the room, so the holder's own echo always fits.
    pub async fn lock_draining<'a>(&mut self, lock: &'a Mutex<()>) -> MutexGuard<'a, ()> {
        let acquire = lock.lock();
        tokio::pin!(acquire);

        let mut open = true;
        let guard = loop {
            tokio::select! {
                biased;

                guard = &mut acquire => break guard,
                event = self.events.recv(), if open => match event {
                    Some(event) => self.backlog.push_back(event),
                    None => open = false,
                },
            }
        };

        while let Ok(event) = self.events.try_recv() {
            self.backlog.push_back(event);
        }
        guard
    }
}
