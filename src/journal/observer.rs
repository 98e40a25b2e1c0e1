use std::fmt;

use super::snapshot::SnapshotId;
use crate::graph::CompartmentId;

/// Notification sent to observers after a journal mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalChange {
    /// A snapshot was pushed. `evicted` lists entries dropped to stay within the bound.
    SnapshotAdded { snapshot: SnapshotId, evicted: Vec<SnapshotId> },
    /// The live graph was restored to `snapshot`
    Navigated { snapshot: SnapshotId, compartment: Option<CompartmentId> },
    /// Entries dropped after the bound was lowered
    Evicted { snapshots: Vec<SnapshotId> },
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returned by journals that never notify
    pub const NONE: SubscriptionId = SubscriptionId(0);
}

pub type JournalObserver = Box<dyn FnMut(&JournalChange)>;

/// Registered change callbacks
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    observers: Vec<(SubscriptionId, JournalObserver)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: JournalObserver) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn notify(&mut self, change: &JournalChange) {
        for (_, observer) in self.observers.iter_mut() {
            observer(change);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.observers.len())
            .finish()
    }
}
