// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot definitions for node inputs/outputs and execution pins.

use crate::contract::ContractDescriptor;
use crate::datum::DatumType;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(pub Uuid);

impl SlotId {
    /// Create a new random slot ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

/// Slot direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotDirection {
    /// Input slot
    Input,
    /// Output slot
    Output,
}

/// What a slot carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Execution flow pin (no data)
    Execution,
    /// Data slot with a declared type
    Data(DatumType),
}

/// A connection point on a node.
///
/// Identity, direction, and declared type are fixed for the slot's
/// lifetime. Attached contracts are consulted, in declaration order, when a
/// connection to or from this slot is authored.
#[derive(Debug, Serialize, Deserialize)]
pub struct Slot {
    /// Unique slot ID
    pub id: SlotId,
    /// Owning node
    pub node: NodeId,
    /// Slot name
    pub name: String,
    /// Slot direction
    pub direction: SlotDirection,
    /// Execution pin or typed data slot
    pub kind: SlotKind,
    /// Attached connection contracts, in declaration order
    #[serde(skip)]
    contracts: Vec<ContractDescriptor>,
}

impl Slot {
    /// Create a new slot
    pub fn new(
        node: NodeId,
        name: impl Into<String>,
        direction: SlotDirection,
        kind: SlotKind,
    ) -> Self {
        Self {
            id: SlotId::new(),
            node,
            name: name.into(),
            direction,
            kind,
            contracts: Vec::new(),
        }
    }

    /// Create a data input slot
    pub fn data_input(node: NodeId, name: impl Into<String>, datum_type: DatumType) -> Self {
        Self::new(node, name, SlotDirection::Input, SlotKind::Data(datum_type))
    }

    /// Create a data output slot
    pub fn data_output(node: NodeId, name: impl Into<String>, datum_type: DatumType) -> Self {
        Self::new(node, name, SlotDirection::Output, SlotKind::Data(datum_type))
    }

    /// Create an execution input pin
    pub fn execution_in(node: NodeId, name: impl Into<String>) -> Self {
        Self::new(node, name, SlotDirection::Input, SlotKind::Execution)
    }

    /// Create an execution output pin
    pub fn execution_out(node: NodeId, name: impl Into<String>) -> Self {
        Self::new(node, name, SlotDirection::Output, SlotKind::Execution)
    }

    /// Attach a contract descriptor (builder form)
    pub fn with_contract(mut self, descriptor: ContractDescriptor) -> Self {
        self.contracts.push(descriptor);
        self
    }

    /// Attach a contract descriptor
    pub fn add_contract(&mut self, descriptor: ContractDescriptor) {
        self.contracts.push(descriptor);
    }

    /// Attached contract descriptors, in declaration order
    pub fn contracts(&self) -> &[ContractDescriptor] {
        &self.contracts
    }

    /// The declared data type, if this is a data slot
    pub fn data_type(&self) -> Option<&DatumType> {
        match &self.kind {
            SlotKind::Data(datum_type) => Some(datum_type),
            SlotKind::Execution => None,
        }
    }

    /// Check if this is an execution pin
    pub fn is_execution(&self) -> bool {
        matches!(self.kind, SlotKind::Execution)
    }
}
