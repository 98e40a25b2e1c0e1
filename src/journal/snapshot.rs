use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::graph::{CompartmentId, Graph};

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a journal entry, unique within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotId(u64);

impl SnapshotId {
    fn next() -> Self {
        Self(NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable, restorable record of the whole graph state
#[derive(Debug)]
pub struct Snapshot {
    id: SnapshotId,
    created: DateTime<Local>,
    name: String,
    description: String,
    icon: Option<String>,
    compartment: Option<CompartmentId>,
    state: Arc<Graph>,
}

impl Snapshot {
    /// Copy the graph into a new entry
    pub fn capture(
        graph: &Graph,
        name: &str,
        description: &str,
        compartment: Option<CompartmentId>,
        icon: Option<&str>,
    ) -> Self {
        Self {
            id: SnapshotId::next(),
            created: Local::now(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.map(str::to_string),
            compartment,
            state: Arc::new(graph.snapshot_copy()),
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn created(&self) -> DateTime<Local> {
        self.created
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn compartment(&self) -> Option<CompartmentId> {
        self.compartment
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.state
    }

    /// Replace the live graph's contents with the stored state
    pub fn restore(&self, graph: &mut Graph) {
        graph.replace_contents(&self.state);
    }
}
