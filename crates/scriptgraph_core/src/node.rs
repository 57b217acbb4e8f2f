// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph data model.

use crate::slot::{Slot, SlotId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A node instance in the graph
#[derive(Debug, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Input slots
    inputs: Vec<Slot>,
    /// Output slots
    outputs: Vec<Slot>,
}

impl Node {
    /// Create a new node with no slots
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Add an input slot, reparenting it to this node
    pub fn add_input(&mut self, mut slot: Slot) -> SlotId {
        slot.node = self.id;
        let id = slot.id;
        self.inputs.push(slot);
        id
    }

    /// Add an output slot, reparenting it to this node
    pub fn add_output(&mut self, mut slot: Slot) -> SlotId {
        slot.node = self.id;
        let id = slot.id;
        self.outputs.push(slot);
        id
    }

    /// Get an input slot by index
    pub fn input(&self, index: usize) -> Option<&Slot> {
        self.inputs.get(index)
    }

    /// Get an output slot by index
    pub fn output(&self, index: usize) -> Option<&Slot> {
        self.outputs.get(index)
    }

    /// Get a slot by ID
    pub fn slot(&self, slot_id: &SlotId) -> Option<&Slot> {
        self.inputs
            .iter()
            .find(|s| s.id == *slot_id)
            .or_else(|| self.outputs.iter().find(|s| s.id == *slot_id))
    }

    /// Get a slot by name
    pub fn slot_named(&self, name: &str) -> Option<&Slot> {
        self.slots().find(|s| s.name == name)
    }

    /// Get all slots
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}
