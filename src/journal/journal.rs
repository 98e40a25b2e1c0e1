use std::sync::Arc;

use tracing::debug;

use super::observer::{JournalChange, JournalObserver, Observers, SubscriptionId};
use super::snapshot::{Snapshot, SnapshotId};
use crate::graph::{CompartmentId, Graph, Node, NodeId, SlotDefinition, SlotDirection, SlotRef};

const ICON_ADD: &str = "actions/list-add";
const ICON_PASTE: &str = "actions/edit-paste";
const ICON_DELETE: &str = "actions/delete";
const ICON_MOVE: &str = "actions/transform-move";
const ICON_EDIT: &str = "actions/edit";
const ICON_CONNECT: &str = "actions/plug";
const ICON_DISCONNECT: &str = "actions/cancel";
const ICON_UNDO: &str = "actions/edit-undo";

fn quoted_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.map(|n| format!("'{}'", n)).collect::<Vec<_>>().join(", ")
}

fn node_name(graph: &Graph, id: NodeId) -> String {
    graph
        .node(id)
        .map(|n| n.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn slot_name(graph: &Graph, slot: &SlotRef) -> String {
    format!("{}/{}", node_name(graph, slot.node), slot.name)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 { one.to_string() } else { many.to_string() }
}

/// Undo/redo history of whole-graph snapshots
///
/// Editors call [`HistoryJournal::snapshot`] (or one of the `snapshot_before_*` helpers)
/// right before they mutate the graph. Undo and redo restore stored states into the live
/// graph that the caller passes in.
pub trait HistoryJournal {
    /// Record the current graph state as a new entry
    fn snapshot(
        &mut self,
        graph: &Graph,
        name: &str,
        description: &str,
        compartment: Option<CompartmentId>,
        icon: Option<&str>,
    );

    /// All entries in chronological order
    fn snapshots(&self) -> Vec<Arc<Snapshot>>;

    /// Restore the graph to an entry. Returns false if the entry is unknown.
    fn go_to_snapshot(
        &mut self,
        graph: &mut Graph,
        target: SnapshotId,
        compartment: Option<CompartmentId>,
    ) -> bool;

    fn current_snapshot(&self) -> Option<Arc<Snapshot>>;

    /// Entry a single undo step would restore
    fn undo_snapshot(&self) -> Option<Arc<Snapshot>>;

    /// Entry a single redo step would restore
    fn redo_snapshot(&self) -> Option<Arc<Snapshot>>;

    fn clear(&mut self);

    fn subscribe(&mut self, observer: JournalObserver) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    fn undo(&mut self, graph: &mut Graph, compartment: Option<CompartmentId>) -> bool {
        match self.undo_snapshot() {
            Some(target) => self.go_to_snapshot(graph, target.id(), compartment),
            None => false,
        }
    }

    fn redo(&mut self, graph: &mut Graph, compartment: Option<CompartmentId>) -> bool {
        match self.redo_snapshot() {
            Some(target) => self.go_to_snapshot(graph, target.id(), compartment),
            None => false,
        }
    }

    // === Snapshot helpers named after the edit about to happen ===

    fn snapshot_before_add_nodes(
        &mut self,
        graph: &Graph,
        nodes: &[Node],
        compartment: Option<CompartmentId>,
    ) {
        let name = plural(nodes.len(), "Add node", "Add nodes");
        let description = format!(
            "Added {} {}",
            plural(nodes.len(), "node", "nodes"),
            quoted_names(nodes.iter().map(|n| n.name.as_str()))
        );
        self.snapshot(graph, &name, &description, compartment, Some(ICON_ADD));
    }

    fn snapshot_before_paste_nodes(
        &mut self,
        graph: &Graph,
        nodes: &[Node],
        compartment: Option<CompartmentId>,
    ) {
        let names = quoted_names(nodes.iter().map(|n| n.name.as_str()));
        let description = format!("Pasted nodes {}", names);
        self.snapshot(graph, "Paste nodes", &description, compartment, Some(ICON_PASTE));
    }

    fn snapshot_before_remove_nodes(
        &mut self,
        graph: &Graph,
        nodes: &[NodeId],
        compartment: Option<CompartmentId>,
    ) {
        let names: Vec<String> = nodes.iter().map(|id| node_name(graph, *id)).collect();
        let name = plural(nodes.len(), "Remove node", "Remove nodes");
        let description = format!(
            "Removed {} {}",
            plural(nodes.len(), "node", "nodes"),
            quoted_names(names.iter().map(String::as_str))
        );
        self.snapshot(graph, &name, &description, compartment, Some(ICON_DELETE));
    }

    fn snapshot_before_move_nodes(
        &mut self,
        graph: &Graph,
        nodes: &[NodeId],
        compartment: Option<CompartmentId>,
    ) {
        let names: Vec<String> = nodes.iter().map(|id| node_name(graph, *id)).collect();
        let description = format!("Moved nodes {}", quoted_names(names.iter().map(String::as_str)));
        self.snapshot(graph, "Move nodes", &description, compartment, Some(ICON_MOVE));
    }

    fn snapshot_before_add_slot(
        &mut self,
        graph: &Graph,
        node: NodeId,
        direction: SlotDirection,
        slot: &SlotDefinition,
        compartment: Option<CompartmentId>,
    ) {
        let description = format!(
            "Added {} slot '{}' to '{}'",
            direction.display_name(),
            slot.name,
            node_name(graph, node)
        );
        self.snapshot(graph, "Add slot", &description, compartment, Some(ICON_ADD));
    }

    fn snapshot_before_remove_slot(
        &mut self,
        graph: &Graph,
        slot: &SlotRef,
        compartment: Option<CompartmentId>,
    ) {
        let description = format!(
            "Removed {} slot '{}' from '{}'",
            slot.direction.display_name(),
            slot.name,
            node_name(graph, slot.node)
        );
        self.snapshot(graph, "Remove slot", &description, compartment, Some(ICON_DELETE));
    }

    fn snapshot_before_label_slot(
        &mut self,
        graph: &Graph,
        slot: &SlotRef,
        compartment: Option<CompartmentId>,
    ) {
        let description = format!("Changed the label of '{}'", slot_name(graph, slot));
        self.snapshot(graph, "Label slot", &description, compartment, Some(ICON_EDIT));
    }

    fn snapshot_before_move_slot(
        &mut self,
        graph: &Graph,
        slot: &SlotRef,
        compartment: Option<CompartmentId>,
    ) {
        let description = format!("Moved '{}'", slot_name(graph, slot));
        self.snapshot(graph, "Move slot", &description, compartment, Some(ICON_MOVE));
    }

    fn snapshot_before_edit_slot(
        &mut self,
        graph: &Graph,
        slot: &SlotRef,
        compartment: Option<CompartmentId>,
    ) {
        let description = format!("Edited '{}'", slot_name(graph, slot));
        self.snapshot(graph, "Edit slot", &description, compartment, Some(ICON_EDIT));
    }

    fn snapshot_before_connect(
        &mut self,
        graph: &Graph,
        source: &SlotRef,
        target: &SlotRef,
        compartment: Option<CompartmentId>,
    ) {
        let description = format!(
            "Connected '{}' to '{}'",
            slot_name(graph, source),
            slot_name(graph, target)
        );
        self.snapshot(graph, "Connect slots", &description, compartment, Some(ICON_CONNECT));
    }

    fn snapshot_before_disconnect(
        &mut self,
        graph: &Graph,
        source: &SlotRef,
        target: &SlotRef,
        compartment: Option<CompartmentId>,
    ) {
        let description = format!(
            "Disconnected '{}' from '{}'",
            slot_name(graph, source),
            slot_name(graph, target)
        );
        self.snapshot(graph, "Disconnect slots", &description, compartment, Some(ICON_DISCONNECT));
    }

    fn snapshot_before_disconnect_all(
        &mut self,
        graph: &Graph,
        slot: &SlotRef,
        compartment: Option<CompartmentId>,
    ) {
        let description = format!("Disconnected all edges of '{}'", slot_name(graph, slot));
        self.snapshot(graph, "Disconnect all", &description, compartment, Some(ICON_DISCONNECT));
    }

    fn snapshot_before_add_compartment(&mut self, graph: &Graph, name: &str) {
        let description = format!("Added compartment '{}'", name);
        self.snapshot(graph, "Add compartment", &description, None, Some(ICON_ADD));
    }

    fn snapshot_before_remove_compartment(&mut self, graph: &Graph, compartment: CompartmentId) {
        let name = graph
            .compartment(compartment)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| compartment.to_string());
        let description = format!("Removed compartment '{}'", name);
        self.snapshot(graph, "Remove compartment", &description, None, Some(ICON_DELETE));
    }
}

/// Journal keeping bounded undo/redo stacks of graph snapshots
#[derive(Debug)]
pub struct GraphHistoryJournal {
    /// Oldest first
    undo_stack: Vec<Arc<Snapshot>>,
    /// Last element is the next entry in time after the undo stack
    redo_stack: Vec<Arc<Snapshot>>,
    current: Option<Arc<Snapshot>>,
    /// Maximum undo stack length, 0 disables snapshots
    max_size: usize,
    observers: Observers,
}

impl GraphHistoryJournal {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current: None,
            max_size,
            observers: Observers::new(),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Apply a new bound, dropping the oldest entries that no longer fit
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        let evicted = self.evict();
        if !evicted.is_empty() {
            self.observers.notify(&JournalChange::Evicted { snapshots: evicted });
        }
    }

    pub fn undo_stack(&self) -> &[Arc<Snapshot>] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[Arc<Snapshot>] {
        &self.redo_stack
    }

    fn contains(&self, id: SnapshotId) -> bool {
        self.undo_stack.iter().chain(self.redo_stack.iter()).any(|s| s.id() == id)
    }

    fn is_current(&self, id: SnapshotId) -> bool {
        self.current.as_ref().is_some_and(|c| c.id() == id)
    }

    fn evict(&mut self) -> Vec<SnapshotId> {
        let mut evicted = Vec::new();
        while self.undo_stack.len() > self.max_size {
            let entry = self.undo_stack.remove(0);
            if self.is_current(entry.id()) {
                self.current = None;
            }
            evicted.push(entry.id());
        }
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "evicted oldest snapshots");
        }
        evicted
    }

    /// Move entries from the top of `from` to `to` until `target` was moved
    fn shift_until(
        from: &mut Vec<Arc<Snapshot>>,
        to: &mut Vec<Arc<Snapshot>>,
        target: SnapshotId,
    ) -> Option<Arc<Snapshot>> {
        while let Some(entry) = from.pop() {
            let found = entry.id() == target;
            to.push(entry.clone());
            if found {
                return Some(entry);
            }
        }
        None
    }
}

impl HistoryJournal for GraphHistoryJournal {
    fn snapshot(
        &mut self,
        graph: &Graph,
        name: &str,
        description: &str,
        compartment: Option<CompartmentId>,
        icon: Option<&str>,
    ) {
        if self.max_size == 0 {
            return;
        }
        let entry = Arc::new(Snapshot::capture(graph, name, description, compartment, icon));
        let id = entry.id();
        debug!(snapshot = %id, label = name, "snapshot");

        self.undo_stack.push(entry);
        self.redo_stack.clear();
        // The current entry may have been discarded with the redo stack
        if self.current.as_ref().is_some_and(|c| !self.contains(c.id())) {
            self.current = None;
        }
        let evicted = self.evict();
        self.observers.notify(&JournalChange::SnapshotAdded { snapshot: id, evicted });
    }

    fn snapshots(&self) -> Vec<Arc<Snapshot>> {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter().rev())
            .cloned()
            .collect()
    }

    fn go_to_snapshot(
        &mut self,
        graph: &mut Graph,
        target: SnapshotId,
        compartment: Option<CompartmentId>,
    ) -> bool {
        let entry = if let Some(current) = self
            .current
            .clone()
            .filter(|c| c.id() == target && self.contains(target))
        {
            current
        } else if self.undo_stack.iter().any(|s| s.id() == target) {
            if self.redo_stack.is_empty() {
                // Keep the state we are leaving reachable through redo
                let before = Snapshot::capture(
                    graph,
                    "Before undo",
                    "Graph state before undo",
                    compartment,
                    Some(ICON_UNDO),
                );
                self.redo_stack.push(Arc::new(before));
            }
            match Self::shift_until(&mut self.undo_stack, &mut self.redo_stack, target) {
                Some(entry) => entry,
                None => return false,
            }
        } else if self.redo_stack.iter().any(|s| s.id() == target) {
            let moved = Self::shift_until(&mut self.redo_stack, &mut self.undo_stack, target);
            let Some(entry) = moved else {
                return false;
            };
            let evicted = self.evict();
            if !evicted.is_empty() {
                self.observers.notify(&JournalChange::Evicted { snapshots: evicted });
            }
            entry
        } else {
            debug!(snapshot = %target, "snapshot not in history");
            return false;
        };

        debug!(snapshot = %target, label = entry.name(), "restoring snapshot");
        entry.restore(graph);
        self.current = Some(entry);
        self.observers.notify(&JournalChange::Navigated { snapshot: target, compartment });
        true
    }

    fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.clone()
    }

    fn undo_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.undo_stack
            .iter()
            .rev()
            .find(|s| !self.is_current(s.id()))
            .cloned()
    }

    fn redo_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.redo_stack
            .iter()
            .rev()
            .find(|s| !self.is_current(s.id()))
            .cloned()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current = None;
        self.observers.notify(&JournalChange::Cleared);
    }

    fn subscribe(&mut self, observer: JournalObserver) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}
