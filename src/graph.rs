pub mod error;
pub mod graph;
pub mod node;
pub mod slot;

pub use error::GraphError;
pub use graph::{CompartmentContents, EdgeRecord, EdgeState, Graph, GraphEvent};
pub use node::{Compartment, CompartmentId, Node, NodeId, Placement, Point};
pub use slot::{SlotConfiguration, SlotDefinition, SlotDirection, SlotRef};
