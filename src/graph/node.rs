use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use super::slot::{SlotConfiguration, SlotDefinition, SlotDirection, SlotRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompartmentId(Uuid);

impl CompartmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CompartmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A named sub-graph that groups nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compartment {
    pub id: CompartmentId,
    pub name: String,
}

impl Compartment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: CompartmentId::new(), name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Node locations per compartment and per named view mode
///
/// A node can be shown in several compartments (e.g. as an exported
/// interface) and each editor view mode keeps its own grid position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placement {
    locations: BTreeMap<CompartmentId, BTreeMap<String, Point>>,
}

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, compartment: CompartmentId, view_mode: &str) -> Option<Point> {
        self.locations.get(&compartment)?.get(view_mode).copied()
    }

    pub fn set(
        &mut self,
        compartment: CompartmentId,
        view_mode: impl Into<String>,
        location: Point,
    ) {
        self.locations
            .entry(compartment)
            .or_default()
            .insert(view_mode.into(), location);
    }

    pub fn clear(&mut self) {
        self.locations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.locations.values().all(|modes| modes.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Type identifier of the algorithm this node runs
    pub kind: String,
    pub compartment: CompartmentId,
    pub slots: SlotConfiguration,
    pub placement: Placement,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        compartment: CompartmentId,
    ) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind: kind.into(),
            compartment,
            slots: SlotConfiguration::new(),
            placement: Placement::new(),
        }
    }

    pub fn with_input(mut self, name: &str, data_type: &str) -> Self {
        self.slots.add(SlotDirection::Input, SlotDefinition::new(name, data_type));
        self
    }

    pub fn with_output(mut self, name: &str, data_type: &str) -> Self {
        self.slots.add(SlotDirection::Output, SlotDefinition::new(name, data_type));
        self
    }

    pub fn with_location(mut self, view_mode: &str, location: Point) -> Self {
        self.placement.set(self.compartment, view_mode, location);
        self
    }

    pub fn input(&self, name: &str) -> SlotRef {
        SlotRef::input(self.id, name)
    }

    pub fn output(&self, name: &str) -> SlotRef {
        SlotRef::output(self.id, name)
    }

    pub fn has_slot(&self, slot: &SlotRef) -> bool {
        slot.node == self.id && self.slots.contains(slot.direction, &slot.name)
    }
}
