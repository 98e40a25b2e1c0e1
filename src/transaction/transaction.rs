use std::collections::BTreeMap;

use tracing::debug;

use super::full_state::FullStateSnapshot;
use crate::graph::{
    Compartment, CompartmentContents, EdgeRecord, EdgeState, Graph, GraphError, Node, NodeId,
    Placement, SlotConfiguration, SlotRef,
};

/// Slot layout of a node plus the edges that were attached to it
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSnapshot {
    pub slots: SlotConfiguration,
    pub edges: Vec<EdgeRecord>,
}

impl SlotSnapshot {
    fn capture(graph: &Graph, node: NodeId) -> Result<Self, GraphError> {
        Ok(Self {
            slots: graph.slot_configuration(node)?.clone(),
            edges: graph.edges_of_node(node),
        })
    }

    fn restore(&self, graph: &mut Graph, node: NodeId) -> Result<(), GraphError> {
        graph.set_slot_configuration(node, self.slots.clone())?;
        for edge in &self.edges {
            if graph.edge(&edge.source, &edge.target).is_some() {
                continue;
            }
            let (source, target) = (edge.source.clone(), edge.target.clone());
            if let Err(err) = graph.connect_with_state(source, target, edge.state) {
                debug!(error = %err, "skipping edge that cannot be restored");
            }
        }
        Ok(())
    }
}

/// A reversible structural edit of a graph
///
/// Commands are built right before the edit is performed. `redo` replays the edit and
/// `undo` reverts it. Variants whose forward state is derived from the graph
/// (`MoveNodes`, `SlotConfigurationChange`) capture that state when they are undone, so
/// their `redo` does nothing until the first `undo`.
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    /// Nodes added to the graph, each re-inserted into its own compartment on redo
    AddNodes { nodes: Vec<Node> },
    /// Nodes removed together with every edge touching them
    RemoveNodes {
        nodes: Vec<Node>,
        edges: Vec<EdgeRecord>,
        /// Presented as "Cut" instead of "Remove nodes"
        cut: bool,
    },
    /// Layout change of any number of nodes
    MoveNodes {
        label: String,
        before: BTreeMap<NodeId, Placement>,
        after: Option<BTreeMap<NodeId, Placement>>,
    },
    Connect { source: SlotRef, target: SlotRef },
    /// One or more sources disconnected from a single target
    Disconnect { edges: Vec<EdgeRecord> },
    /// Every outgoing edge of a slot disconnected
    DisconnectAll { source: SlotRef, edges: Vec<EdgeRecord> },
    /// Toggle the display-only hidden flag of an edge
    HideEdge { source: SlotRef, target: SlotRef, hidden: bool },
    SlotConfigurationChange {
        label: String,
        node: NodeId,
        before: SlotSnapshot,
        after: Option<SlotSnapshot>,
    },
    /// A compartment imported into the graph. Undo removes it, redo re-adds it with its
    /// original id and contents.
    ImportCompartment {
        compartment: Compartment,
        removed: Option<CompartmentContents>,
    },
    FullState(FullStateSnapshot),
    /// Multiple transactions undone and redone as one unit
    Compound(Vec<Transaction>),
}

impl Transaction {
    // === Constructors ===

    pub fn add_nodes(nodes: Vec<Node>) -> Self {
        Transaction::AddNodes { nodes }
    }

    /// Record nodes about to be removed, including every edge attached to them
    pub fn remove_nodes(graph: &Graph, ids: &[NodeId]) -> Result<Self, GraphError> {
        Self::removal(graph, ids, false)
    }

    /// Same mechanics as [`Transaction::remove_nodes`], labelled as a cut
    pub fn cut_nodes(graph: &Graph, ids: &[NodeId]) -> Result<Self, GraphError> {
        Self::removal(graph, ids, true)
    }

    fn removal(graph: &Graph, ids: &[NodeId], cut: bool) -> Result<Self, GraphError> {
        let nodes = ids
            .iter()
            .map(|id| graph.node(*id).cloned().ok_or(GraphError::UnknownNode(*id)))
            .collect::<Result<Vec<_>, _>>()?;
        let edges = graph
            .edges()
            .into_iter()
            .filter(|e| ids.contains(&e.source.node) || ids.contains(&e.target.node))
            .collect();
        Ok(Transaction::RemoveNodes { nodes, edges, cut })
    }

    /// Record the current layout of every node
    pub fn move_nodes(graph: &Graph, label: impl Into<String>) -> Self {
        Transaction::MoveNodes {
            label: label.into(),
            before: graph.placements(),
            after: None,
        }
    }

    pub fn connect(source: SlotRef, target: SlotRef) -> Self {
        Transaction::Connect { source, target }
    }

    /// Record edges from `sources` to `target` about to be removed
    pub fn disconnect(graph: &Graph, sources: Vec<SlotRef>, target: SlotRef) -> Self {
        let edges = sources
            .into_iter()
            .map(|source| {
                let state = graph
                    .edge(&source, &target)
                    .unwrap_or(EdgeState { user_made: true, hidden: false });
                EdgeRecord { source, target: target.clone(), state }
            })
            .collect();
        Transaction::Disconnect { edges }
    }

    /// Record the current targets of `source`
    pub fn disconnect_all(graph: &Graph, source: SlotRef) -> Self {
        let edges = graph
            .targets_of(&source)
            .into_iter()
            .map(|target| {
                let state = graph.edge(&source, &target).unwrap_or_default();
                EdgeRecord { source: source.clone(), target, state }
            })
            .collect();
        Transaction::DisconnectAll { source, edges }
    }

    pub fn hide_edge(source: SlotRef, target: SlotRef, hidden: bool) -> Self {
        Transaction::HideEdge { source, target, hidden }
    }

    /// Record the slot configuration of a node about to be edited
    pub fn slot_configuration_change(
        graph: &Graph,
        node: NodeId,
        label: impl Into<String>,
    ) -> Result<Self, GraphError> {
        Ok(Transaction::SlotConfigurationChange {
            label: label.into(),
            node,
            before: SlotSnapshot::capture(graph, node)?,
            after: None,
        })
    }

    pub fn import_compartment(compartment: Compartment) -> Self {
        Transaction::ImportCompartment { compartment, removed: None }
    }

    pub fn full_state(graph: &Graph, label: impl Into<String>) -> Self {
        Transaction::FullState(FullStateSnapshot::new(graph, label))
    }

    pub fn compound(txns: Vec<Transaction>) -> Self {
        Transaction::Compound(txns)
    }

    // === Presentation ===

    pub fn label(&self) -> String {
        match self {
            Transaction::AddNodes { .. } => "Add nodes".to_string(),
            Transaction::RemoveNodes { cut: true, .. } => "Cut".to_string(),
            Transaction::RemoveNodes { cut: false, .. } => "Remove nodes".to_string(),
            Transaction::MoveNodes { label, .. } => label.clone(),
            Transaction::Connect { .. } => "Connect slots".to_string(),
            Transaction::Disconnect { .. } => "Disconnect slots".to_string(),
            Transaction::DisconnectAll { .. } => "Disconnect all".to_string(),
            Transaction::HideEdge { hidden: true, .. } => "Hide edge".to_string(),
            Transaction::HideEdge { hidden: false, .. } => "Show edge".to_string(),
            Transaction::SlotConfigurationChange { label, .. } => label.clone(),
            Transaction::ImportCompartment { .. } => "Import compartment".to_string(),
            Transaction::FullState(snapshot) => snapshot.label().to_string(),
            Transaction::Compound(txns) => txns
                .iter()
                .map(|t| t.label())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Number of nodes and edges touched, used to flag expensive replays
    pub fn estimated_size(&self) -> usize {
        match self {
            Transaction::AddNodes { nodes } => nodes.len(),
            Transaction::RemoveNodes { nodes, edges, .. } => nodes.len() + edges.len(),
            Transaction::MoveNodes { before, .. } => before.len(),
            Transaction::Connect { .. } => 1,
            Transaction::Disconnect { edges } => edges.len(),
            Transaction::DisconnectAll { edges, .. } => edges.len(),
            Transaction::HideEdge { .. } => 1,
            Transaction::SlotConfigurationChange { before, .. } => {
                before.slots.len() + before.edges.len()
            }
            Transaction::ImportCompartment { removed, .. } => removed
                .as_ref()
                .map(|c| c.nodes.len() + c.edges.len())
                .unwrap_or(1),
            Transaction::FullState(snapshot) => snapshot.estimated_size(),
            Transaction::Compound(txns) => txns.iter().map(|t| t.estimated_size()).sum(),
        }
    }

    // === Replay ===

    /// Re-apply the edit
    pub fn redo(&mut self, graph: &mut Graph) -> Result<(), GraphError> {
        match self {
            Transaction::AddNodes { nodes } => {
                for node in nodes.iter() {
                    graph.insert_node(node.clone(), node.compartment)?;
                }
            }
            Transaction::RemoveNodes { nodes, .. } => {
                for node in nodes.iter() {
                    graph.remove_node(node.id, true)?;
                }
            }
            Transaction::MoveNodes { label, after, .. } => match after {
                Some(after) => {
                    graph.set_placements(after);
                    graph.notify_changed();
                }
                None => debug!(label = %label, "nothing to redo, transaction was never undone"),
            },
            Transaction::Connect { source, target } => {
                graph.connect(source.clone(), target.clone(), true)?;
            }
            Transaction::Disconnect { edges } | Transaction::DisconnectAll { edges, .. } => {
                for edge in edges.iter() {
                    graph.disconnect(&edge.source, &edge.target, false)?;
                }
            }
            Transaction::HideEdge { source, target, hidden } => {
                graph.set_edge_hidden(source, target, *hidden)?;
            }
            Transaction::SlotConfigurationChange { label, node, after, .. } => match after {
                Some(after) => after.restore(graph, *node)?,
                None => debug!(label = %label, "nothing to redo, transaction was never undone"),
            },
            Transaction::ImportCompartment { compartment, removed } => {
                if let Some(contents) = removed.take() {
                    *compartment = contents.compartment.clone();
                    graph.insert_compartment_contents(contents)?;
                }
            }
            Transaction::FullState(snapshot) => {
                if !snapshot.redo(graph) {
                    debug!(label = snapshot.label(), "no changed graph recorded, nothing to redo");
                }
            }
            Transaction::Compound(txns) => {
                for txn in txns.iter_mut() {
                    txn.redo(graph)?;
                }
            }
        }
        Ok(())
    }

    /// Revert the edit
    pub fn undo(&mut self, graph: &mut Graph) -> Result<(), GraphError> {
        match self {
            Transaction::AddNodes { nodes } => {
                // Keep the latest version of each node so redo restores it as it was undone
                for node in nodes.iter_mut() {
                    if let Some(live) = graph.node(node.id) {
                        *node = live.clone();
                    }
                    graph.remove_node(node.id, true)?;
                }
            }
            Transaction::RemoveNodes { nodes, edges, .. } => {
                for node in nodes.iter() {
                    graph.insert_node(node.clone(), node.compartment)?;
                }
                for edge in edges.iter() {
                    graph.connect_with_state(edge.source.clone(), edge.target.clone(), edge.state)?;
                }
            }
            Transaction::MoveNodes { before, after, .. } => {
                *after = Some(graph.placements());
                graph.set_placements(before);
                graph.notify_changed();
            }
            Transaction::Connect { source, target } => {
                graph.disconnect(source, target, false)?;
            }
            Transaction::Disconnect { edges } | Transaction::DisconnectAll { edges, .. } => {
                for edge in edges.iter() {
                    graph.connect_with_state(edge.source.clone(), edge.target.clone(), edge.state)?;
                }
            }
            Transaction::HideEdge { source, target, hidden } => {
                graph.set_edge_hidden(source, target, !*hidden)?;
            }
            Transaction::SlotConfigurationChange { node, before, after, .. } => {
                *after = Some(SlotSnapshot::capture(graph, *node)?);
                before.restore(graph, *node)?;
            }
            Transaction::ImportCompartment { compartment, removed } => {
                *removed = Some(graph.remove_compartment(compartment.id)?);
            }
            Transaction::FullState(snapshot) => {
                snapshot.undo(graph);
            }
            Transaction::Compound(txns) => {
                for txn in txns.iter_mut().rev() {
                    txn.undo(graph)?;
                }
            }
        }
        Ok(())
    }
}
