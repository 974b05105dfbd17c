//! Bottom-up change notifications
//!
//! Mutations report the path from the changed node to its root. Listeners
//! see each affected node once per notification, and a suspended notifier
//! merges every path raised while suspended into a single notification.
//!
//! The notifier only decides what to send. Delivery happens through a
//! `Dispatch` after the caller has released the notifier lock, so a
//! listener may read or subscribe to the tree it observes.

use std::sync::Arc;

use smallvec::SmallVec;

use super::node::NodeId;

/// One "updated" notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeUpdate {
    /// Tree revision after this update
    pub revision: u64,
    /// Changed nodes and their ancestors, nearest first, each listed once.
    /// Empty when only the root list changed.
    pub affected: Vec<NodeId>,
}

/// Handle returned by `ConditionTree::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub(crate) type Listener = Arc<dyn Fn(&TreeUpdate) + Send + Sync>;

/// An update together with the listeners registered when it was raised
#[must_use]
pub(crate) struct Dispatch {
    update: TreeUpdate,
    listeners: SmallVec<[Listener; 2]>,
}

impl Dispatch {
    pub(crate) fn deliver(self) {
        for listener in &self.listeners {
            listener(&self.update);
        }
    }
}

#[derive(Default)]
pub(crate) struct Notifier {
    listeners: SmallVec<[(ListenerId, Listener); 2]>,
    next_listener: u64,
    revision: u64,
    suspended: usize,
    pending: Option<Vec<NodeId>>,
}

impl Notifier {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    #[inline]
    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn suspend(&mut self) {
        self.suspended += 1;
    }

    /// Leave one suspension level; yields the merged update at the outermost level
    pub(crate) fn resume(&mut self) -> Option<Dispatch> {
        self.suspended = self.suspended.saturating_sub(1);
        if self.suspended > 0 {
            return None;
        }
        self.pending.take().map(|affected| self.publish(affected))
    }

    pub(crate) fn raise(&mut self, path: Vec<NodeId>) -> Option<Dispatch> {
        if self.suspended > 0 {
            let pending = self.pending.get_or_insert_with(Vec::new);
            for id in path {
                if !pending.contains(&id) {
                    pending.push(id);
                }
            }
            return None;
        }

        Some(self.publish(path))
    }

    fn publish(&mut self, affected: Vec<NodeId>) -> Dispatch {
        self.revision += 1;
        let update = TreeUpdate {
            revision: self.revision,
            affected,
        };
        tracing::trace!(
            revision = update.revision,
            affected = update.affected.len(),
            "condition tree updated"
        );
        Dispatch {
            update,
            listeners: self.listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
        }
    }
}
