// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-step execution state for the node executor.

use scriptgraph_core::{Datum, NodeId, SlotId};
use std::collections::{HashMap, HashSet};

/// The value store for one node-evaluation step.
///
/// The bridge writes result datums into the frame; the executor reads them
/// out and discards the frame when the step completes. Values never survive
/// across steps. The frame also carries the explicit in-progress guard that
/// refuses reentrant execution of a node, so cycles in user-authored graphs
/// cannot recurse.
#[derive(Debug, Default)]
pub struct ExecutionFrame {
    values: HashMap<SlotId, Datum>,
    in_progress: HashSet<NodeId>,
}

impl ExecutionFrame {
    /// Create a new empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a slot value
    pub fn set_value(&mut self, slot: SlotId, value: Datum) {
        self.values.insert(slot, value);
    }

    /// Read a slot value
    pub fn value(&self, slot: SlotId) -> Option<&Datum> {
        self.values.get(&slot)
    }

    /// Remove and return a slot value
    pub fn take_value(&mut self, slot: SlotId) -> Option<Datum> {
        self.values.remove(&slot)
    }

    /// The number of populated slots
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Mark a node as executing; refused if it already is
    pub fn enter(&mut self, node: NodeId) -> Result<(), ReentrancyError> {
        if self.in_progress.insert(node) {
            Ok(())
        } else {
            Err(ReentrancyError(node))
        }
    }

    /// Mark a node as no longer executing
    pub fn leave(&mut self, node: NodeId) {
        self.in_progress.remove(&node);
    }

    /// Check whether a node is currently executing
    pub fn is_in_progress(&self, node: NodeId) -> bool {
        self.in_progress.contains(&node)
    }
}

/// A node was entered while already executing
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("node {0:?} is already executing")]
pub struct ReentrancyError(pub NodeId);
