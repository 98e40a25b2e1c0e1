use std::sync::Arc;

use crate::graph::Graph;

/// Whole-graph undo record for edits that are not worth decomposing
///
/// Holds an immutable copy of the graph taken before the edit and, once the owner calls
/// [`FullStateSnapshot::set_changed_graph`], a copy of the result. Undo and redo restore
/// one of the two versions; the stored versions are shared and never consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct FullStateSnapshot {
    label: String,
    backup: Arc<Graph>,
    changed: Option<Arc<Graph>>,
}

impl FullStateSnapshot {
    pub fn new(graph: &Graph, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            backup: Arc::new(graph.snapshot_copy()),
            changed: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn backup(&self) -> &Arc<Graph> {
        &self.backup
    }

    pub fn changed(&self) -> Option<&Arc<Graph>> {
        self.changed.as_ref()
    }

    /// Record the state after the edit so the snapshot can be redone
    pub fn set_changed_graph(&mut self, graph: &Graph) {
        self.changed = Some(Arc::new(graph.snapshot_copy()));
    }

    pub fn undo(&self, graph: &mut Graph) {
        graph.replace_contents(&self.backup);
    }

    /// Returns false if no post-edit state was recorded
    pub fn redo(&self, graph: &mut Graph) -> bool {
        match &self.changed {
            Some(changed) => {
                graph.replace_contents(changed);
                true
            }
            None => false,
        }
    }

    pub fn estimated_size(&self) -> usize {
        self.backup.node_count() + self.backup.edge_count()
    }
}
