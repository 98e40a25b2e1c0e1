use std::sync::Arc;

use super::journal::HistoryJournal;
use super::observer::{JournalObserver, SubscriptionId};
use super::snapshot::{Snapshot, SnapshotId};
use crate::graph::{CompartmentId, Graph};

/// Journal that records nothing, for contexts without history tracking
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyHistoryJournal;

impl DummyHistoryJournal {
    pub fn new() -> Self {
        Self
    }
}

impl HistoryJournal for DummyHistoryJournal {
    fn snapshot(
        &mut self,
        _graph: &Graph,
        _name: &str,
        _description: &str,
        _compartment: Option<CompartmentId>,
        _icon: Option<&str>,
    ) {
    }

    fn snapshots(&self) -> Vec<Arc<Snapshot>> {
        Vec::new()
    }

    fn go_to_snapshot(
        &mut self,
        _graph: &mut Graph,
        _target: SnapshotId,
        _compartment: Option<CompartmentId>,
    ) -> bool {
        false
    }

    fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        None
    }

    fn undo_snapshot(&self) -> Option<Arc<Snapshot>> {
        None
    }

    fn redo_snapshot(&self) -> Option<Arc<Snapshot>> {
        None
    }

    fn clear(&mut self) {}

    fn subscribe(&mut self, _observer: JournalObserver) -> SubscriptionId {
        SubscriptionId::NONE
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) -> bool {
        false
    }

    fn undo(&mut self, _graph: &mut Graph, _compartment: Option<CompartmentId>) -> bool {
        false
    }

    fn redo(&mut self, _graph: &mut Graph, _compartment: Option<CompartmentId>) -> bool {
        false
    }
}
