use std::collections::BTreeMap;

use super::error::GraphError;
use super::node::{Compartment, CompartmentId, Node, NodeId, Placement, Point};
use super::slot::{SlotConfiguration, SlotDirection, SlotRef};

/// Per-edge flags that do not affect connectivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeState {
    /// Created by a user gesture. Only such edges can be removed by a user-initiated disconnect.
    pub user_made: bool,
    /// Display-only flag
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub source: SlotRef,
    pub target: SlotRef,
    pub state: EdgeState,
}

/// Everything removed together with a compartment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompartmentContents {
    pub compartment: Compartment,
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeRecord>,
}

/// Change notifications queued by graph mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    Connected { source: SlotRef, target: SlotRef },
    Disconnected { source: SlotRef, target: SlotRef },
    EdgeVisibilityChanged { source: SlotRef, target: SlotRef, hidden: bool },
    SlotsChanged(NodeId),
    PlacementChanged(NodeId),
    CompartmentAdded(CompartmentId),
    CompartmentRemoved(CompartmentId),
    /// Bulk change (contents replaced, layout restored)
    Changed,
}

/// Pipeline graph: nodes grouped into compartments, edges from output slots to input slots
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<(SlotRef, SlotRef), EdgeState>,
    compartments: BTreeMap<CompartmentId, Compartment>,
    /// Pending notifications, not part of the graph state
    events: Vec<GraphEvent>,
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
            && self.edges == other.edges
            && self.compartments == other.compartments
    }
}

impl Eq for Graph {}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // === Queries ===

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes_in(&self, compartment: CompartmentId) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.compartment == compartment)
    }

    pub fn compartment(&self, id: CompartmentId) -> Option<&Compartment> {
        self.compartments.get(&id)
    }

    pub fn compartments(&self) -> impl Iterator<Item = &Compartment> {
        self.compartments.values()
    }

    pub fn edge(&self, source: &SlotRef, target: &SlotRef) -> Option<EdgeState> {
        self.edges.get(&(source.clone(), target.clone())).copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> Vec<EdgeRecord> {
        self.edges
            .iter()
            .map(|((source, target), state)| EdgeRecord {
                source: source.clone(),
                target: target.clone(),
                state: *state,
            })
            .collect()
    }

    /// All edges that start or end at one of the node's slots
    pub fn edges_of_node(&self, id: NodeId) -> Vec<EdgeRecord> {
        self.edges()
            .into_iter()
            .filter(|e| e.source.node == id || e.target.node == id)
            .collect()
    }

    pub fn sources_of(&self, target: &SlotRef) -> Vec<SlotRef> {
        self.edges
            .keys()
            .filter(|(_, t)| t == target)
            .map(|(s, _)| s.clone())
            .collect()
    }

    pub fn targets_of(&self, source: &SlotRef) -> Vec<SlotRef> {
        self.edges
            .keys()
            .filter(|(s, _)| s == source)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn slot_configuration(&self, id: NodeId) -> Result<&SlotConfiguration, GraphError> {
        self.nodes
            .get(&id)
            .map(|n| &n.slots)
            .ok_or(GraphError::UnknownNode(id))
    }

    /// Placement of every node, keyed by node
    pub fn placements(&self) -> BTreeMap<NodeId, Placement> {
        self.nodes
            .iter()
            .map(|(id, node)| (*id, node.placement.clone()))
            .collect()
    }

    fn require_slot(&self, slot: &SlotRef) -> Result<(), GraphError> {
        let node = self.nodes.get(&slot.node).ok_or(GraphError::UnknownNode(slot.node))?;
        if node.has_slot(slot) {
            Ok(())
        } else {
            Err(GraphError::UnknownSlot(slot.clone()))
        }
    }

    // === Compartments ===

    pub fn add_compartment(
        &mut self,
        compartment: Compartment,
    ) -> Result<CompartmentId, GraphError> {
        let id = compartment.id;
        if self.compartments.contains_key(&id) {
            return Err(GraphError::DuplicateCompartment(id));
        }
        self.compartments.insert(id, compartment);
        self.events.push(GraphEvent::CompartmentAdded(id));
        Ok(id)
    }

    /// Remove a compartment together with its nodes and their edges
    pub fn remove_compartment(
        &mut self,
        id: CompartmentId,
    ) -> Result<CompartmentContents, GraphError> {
        if !self.compartments.contains_key(&id) {
            return Err(GraphError::UnknownCompartment(id));
        }
        let node_ids: Vec<NodeId> = self.nodes_in(id).map(|n| n.id).collect();
        let edges: Vec<EdgeRecord> = self
            .edges()
            .into_iter()
            .filter(|e| node_ids.contains(&e.source.node) || node_ids.contains(&e.target.node))
            .collect();

        let mut nodes = Vec::with_capacity(node_ids.len());
        for node_id in node_ids {
            nodes.push(self.remove_node(node_id, true)?);
        }

        let compartment = self
            .compartments
            .remove(&id)
            .ok_or(GraphError::UnknownCompartment(id))?;
        self.events.push(GraphEvent::CompartmentRemoved(id));

        Ok(CompartmentContents { compartment, nodes, edges })
    }

    /// Re-add a previously removed compartment with its original id, nodes and edges
    ///
    /// Edges to nodes outside the compartment are only restored if the other end still exists.
    pub fn insert_compartment_contents(
        &mut self,
        contents: CompartmentContents,
    ) -> Result<CompartmentId, GraphError> {
        let CompartmentContents { compartment, nodes, edges } = contents;
        let id = self.add_compartment(compartment)?;
        for node in nodes {
            self.insert_node(node, id)?;
        }
        for edge in edges {
            if self.require_slot(&edge.source).is_ok() && self.require_slot(&edge.target).is_ok() {
                self.connect_with_state(edge.source, edge.target, edge.state)?;
            }
        }
        Ok(id)
    }

    // === Nodes ===

    /// Insert a node into the given compartment, keeping the node's id
    pub fn insert_node(
        &mut self,
        mut node: Node,
        compartment: CompartmentId,
    ) -> Result<NodeId, GraphError> {
        if !self.compartments.contains_key(&compartment) {
            return Err(GraphError::UnknownCompartment(compartment));
        }
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id;
        node.compartment = compartment;
        self.nodes.insert(id, node);
        self.events.push(GraphEvent::NodeAdded(id));
        Ok(id)
    }

    /// Remove a node. Without `cascade_edges` this fails while edges still touch the node.
    pub fn remove_node(&mut self, id: NodeId, cascade_edges: bool) -> Result<Node, GraphError> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::UnknownNode(id));
        }
        let touching = self.edges_of_node(id);
        if !touching.is_empty() && !cascade_edges {
            return Err(GraphError::NodeHasEdges(id));
        }
        for edge in touching {
            self.edges.remove(&(edge.source.clone(), edge.target.clone()));
            self.events.push(GraphEvent::Disconnected { source: edge.source, target: edge.target });
        }
        let node = self.nodes.remove(&id).ok_or(GraphError::UnknownNode(id))?;
        self.events.push(GraphEvent::NodeRemoved(id));
        Ok(node)
    }

    pub fn set_placement(
        &mut self,
        id: NodeId,
        compartment: CompartmentId,
        view_mode: &str,
        location: Point,
    ) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
        node.placement.set(compartment, view_mode, location);
        self.events.push(GraphEvent::PlacementChanged(id));
        Ok(())
    }

    /// Overwrite node placements. Nodes that no longer exist are skipped.
    pub fn set_placements(&mut self, placements: &BTreeMap<NodeId, Placement>) {
        for (id, placement) in placements {
            if let Some(node) = self.nodes.get_mut(id) {
                node.placement = placement.clone();
            }
        }
    }

    /// Replace the slot configuration of a node
    ///
    /// Edges attached to slots that no longer exist are removed and returned.
    pub fn set_slot_configuration(
        &mut self,
        id: NodeId,
        slots: SlotConfiguration,
    ) -> Result<Vec<EdgeRecord>, GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
        node.slots = slots;

        let dangling: Vec<EdgeRecord> = self
            .edges_of_node(id)
            .into_iter()
            .filter(|e| {
                self.require_slot(&e.source).is_err() || self.require_slot(&e.target).is_err()
            })
            .collect();
        for edge in &dangling {
            self.edges.remove(&(edge.source.clone(), edge.target.clone()));
            self.events.push(GraphEvent::Disconnected {
                source: edge.source.clone(),
                target: edge.target.clone(),
            });
        }
        self.events.push(GraphEvent::SlotsChanged(id));
        Ok(dangling)
    }

    // === Edges ===

    pub fn connect(
        &mut self,
        source: SlotRef,
        target: SlotRef,
        user_made: bool) -> Result<(), GraphError> {
        self.connect_with_state(source, target, EdgeState { user_made, hidden: false })
    }

    /// Connect and restore previously recorded edge flags
    pub fn connect_with_state(
        &mut self,
        source: SlotRef,
        target: SlotRef,
        state: EdgeState) -> Result<(), GraphError> {
        if source.direction != SlotDirection::Output || target.direction != SlotDirection::Input {
            return Err(GraphError::DirectionMismatch { from: source, to: target });
        }
        self.require_slot(&source)?;
        self.require_slot(&target)?;

        let key = (source, target);
        if self.edges.contains_key(&key) {
            return Err(GraphError::AlreadyConnected { from: key.0, to: key.1 });
        }
        self.events.push(GraphEvent::Connected { source: key.0.clone(), target: key.1.clone() });
        self.edges.insert(key, state);
        Ok(())
    }

    /// Remove an edge
    ///
    /// A user-initiated disconnect leaves edges that were not made by the user in place and
    /// returns `Ok(false)`.
    pub fn disconnect(
        &mut self,
        source: &SlotRef,
        target: &SlotRef,
        user: bool,
    ) -> Result<bool, GraphError> {
        let key = (source.clone(), target.clone());
        let state = match self.edges.get(&key) {
            Some(state) => *state,
            None => {
                return Err(GraphError::UnknownEdge { from: key.0, to: key.1 });
            }
        };
        if user && !state.user_made {
            return Ok(false);
        }
        self.edges.remove(&key);
        self.events.push(GraphEvent::Disconnected { source: key.0, target: key.1 });
        Ok(true)
    }

    /// Disconnect every outgoing edge of `source`, returns the targets that were disconnected
    pub fn disconnect_all(
        &mut self,
        source: &SlotRef,
        user: bool,
    ) -> Result<Vec<SlotRef>, GraphError> {
        self.require_slot(source)?;
        let mut removed = Vec::new();
        for target in self.targets_of(source) {
            if self.disconnect(source, &target, user)? {
                removed.push(target);
            }
        }
        Ok(removed)
    }

    pub fn set_edge_hidden(
        &mut self,
        source: &SlotRef,
        target: &SlotRef,
        hidden: bool) -> Result<(), GraphError> {
        let key = (source.clone(), target.clone());
        match self.edges.get_mut(&key) {
            Some(state) => {
                state.hidden = hidden;
                self.events.push(GraphEvent::EdgeVisibilityChanged {
                    source: key.0,
                    target: key.1,
                    hidden,
                });
                Ok(())
            }
            None => Err(GraphError::UnknownEdge { from: key.0, to: key.1 }),
        }
    }

    // === Whole-graph state ===

    /// Deep copy of the graph state without pending notifications
    pub fn snapshot_copy(&self) -> Graph {
        Graph {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            compartments: self.compartments.clone(),
            events: Vec::new(),
        }
    }

    /// Overwrite this graph's contents with a copy of `other`
    pub fn replace_contents(&mut self, other: &Graph) {
        self.nodes = other.nodes.clone();
        self.edges = other.edges.clone();
        self.compartments = other.compartments.clone();
        self.events.push(GraphEvent::Changed);
    }

    pub fn notify_changed(&mut self) {
        self.events.push(GraphEvent::Changed);
    }

    /// Drain queued change notifications
    pub fn take_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }
}
