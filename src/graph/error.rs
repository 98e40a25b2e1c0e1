use thiserror::Error;

use super::node::{CompartmentId, NodeId};
use super::slot::SlotRef;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),
    #[error("compartment {0} does not exist")]
    UnknownCompartment(CompartmentId),
    #[error("compartment {0} already exists")]
    DuplicateCompartment(CompartmentId),
    #[error("slot {0} does not exist")]
    UnknownSlot(SlotRef),
    #[error("cannot connect {from} to {to}: edges run from an output to an input")]
    DirectionMismatch { from: SlotRef, to: SlotRef },
    #[error("{from} is already connected to {to}")]
    AlreadyConnected { from: SlotRef, to: SlotRef },
    #[error("no edge from {from} to {to}")]
    UnknownEdge { from: SlotRef, to: SlotRef },
    #[error("node {0} still has edges")]
    NodeHasEdges(NodeId),
}
