use std::fmt;

use super::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotDirection {
    Input,
    Output,
}

impl SlotDirection {
    pub fn display_name(&self) -> &'static str {
        match self {
            SlotDirection::Input => "input",
            SlotDirection::Output => "output",
        }
    }
}

/// Address of a single slot (port) on a node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotRef {
    pub node: NodeId,
    pub direction: SlotDirection,
    pub name: String,
}

impl SlotRef {
    pub fn input(node: NodeId, name: impl Into<String>) -> Self {
        Self { node, direction: SlotDirection::Input, name: name.into() }
    }

    pub fn output(node: NodeId, name: impl Into<String>) -> Self {
        Self { node, direction: SlotDirection::Output, name: name.into() }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.node, self.direction.display_name(), self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDefinition {
    pub name: String,
    pub data_type: String,
    /// Custom display label, overrides the name in editors
    pub label: Option<String>,
}

impl SlotDefinition {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self { name: name.into(), data_type: data_type.into(), label: None }
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered input and output slots of a node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotConfiguration {
    pub inputs: Vec<SlotDefinition>,
    pub outputs: Vec<SlotDefinition>,
}

impl SlotConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self, direction: SlotDirection) -> &Vec<SlotDefinition> {
        match direction {
            SlotDirection::Input => &self.inputs,
            SlotDirection::Output => &self.outputs,
        }
    }

    fn slots_mut(&mut self, direction: SlotDirection) -> &mut Vec<SlotDefinition> {
        match direction {
            SlotDirection::Input => &mut self.inputs,
            SlotDirection::Output => &mut self.outputs,
        }
    }

    pub fn get(&self, direction: SlotDirection, name: &str) -> Option<&SlotDefinition> {
        self.slots(direction).iter().find(|s| s.name == name)
    }

    pub fn contains(&self, direction: SlotDirection, name: &str) -> bool {
        self.get(direction, name).is_some()
    }

    /// Add a slot, returns false if a slot with that name already exists
    pub fn add(&mut self, direction: SlotDirection, slot: SlotDefinition) -> bool {
        if self.contains(direction, &slot.name) {
            return false;
        }
        self.slots_mut(direction).push(slot);
        true
    }

    pub fn remove(&mut self, direction: SlotDirection, name: &str) -> Option<SlotDefinition> {
        let slots = self.slots_mut(direction);
        let idx = slots.iter().position(|s| s.name == name)?;
        Some(slots.remove(idx))
    }

    pub fn set_label(
        &mut self,
        direction: SlotDirection,
        name: &str,
        label: Option<String>,
    ) -> bool {
        match self.slots_mut(direction).iter_mut().find(|s| s.name == name) {
            Some(slot) => {
                slot.label = label;
                true
            }
            None => false,
        }
    }

    /// Swap a slot with its predecessor
    pub fn move_up(&mut self, direction: SlotDirection, name: &str) -> bool {
        let slots = self.slots_mut(direction);
        match slots.iter().position(|s| s.name == name) {
            Some(idx) if idx > 0 => {
                slots.swap(idx - 1, idx);
                true
            }
            _ => false,
        }
    }

    /// Swap a slot with its successor
    pub fn move_down(&mut self, direction: SlotDirection, name: &str) -> bool {
        let slots = self.slots_mut(direction);
        match slots.iter().position(|s| s.name == name) {
            Some(idx) if idx + 1 < slots.len() => {
                slots.swap(idx, idx + 1);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inputs.len() + self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
