// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! [`Graph::connect`] is the edge-creation entry point: it performs the
//! structural checks and then runs every contract attached to the two
//! endpoint slots. No connection is recorded unless all contracts accept it.

use crate::connection::{Connection, ConnectionId};
use crate::contract::{self, ContractViolation};
use crate::node::{Node, NodeId};
use crate::slot::{SlotDirection, SlotId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node graph
#[derive(Debug, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between slots
    connections: IndexMap<ConnectionId, Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        self.nodes.swap_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Author a connection between two slots.
    ///
    /// Structural checks (existence, direction, self-loop, duplicate input
    /// edge) run first; the endpoint slots' attached contracts are then
    /// evaluated in declared order, fail-fast. The connection is recorded
    /// only if every check and contract accepts it.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_slot: SlotId,
        to_node: NodeId,
        to_slot: SlotId,
    ) -> Result<ConnectionId, ConnectionError> {
        let source_node = self
            .nodes
            .get(&from_node)
            .ok_or(ConnectionError::NodeNotFound(from_node))?;
        let target_node = self
            .nodes
            .get(&to_node)
            .ok_or(ConnectionError::NodeNotFound(to_node))?;

        let source_slot = source_node
            .slot(&from_slot)
            .ok_or(ConnectionError::SlotNotFound(from_slot))?;
        let target_slot = target_node
            .slot(&to_slot)
            .ok_or(ConnectionError::SlotNotFound(to_slot))?;

        if from_node == to_node {
            return Err(ConnectionError::SelfLoop);
        }

        if source_slot.direction != SlotDirection::Output
            || target_slot.direction != SlotDirection::Input
        {
            return Err(ConnectionError::DirectionMismatch);
        }

        // A data input accepts at most one incoming edge
        if !target_slot.is_execution() && self.connections.values().any(|c| c.to_slot == to_slot) {
            return Err(ConnectionError::SlotAlreadyConnected(to_slot));
        }

        contract::evaluate_connection(source_slot, target_slot)?;

        let connection = Connection::new(from_node, from_slot, to_node, to_slot);
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.swap_remove(&connection_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections from a specific slot
    pub fn connections_from(&self, slot_id: SlotId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.from_slot == slot_id)
    }

    /// Get connections to a specific slot
    pub fn connections_to(&self, slot_id: SlotId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.to_slot == slot_id)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when authoring a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Slot not found
    #[error("Slot not found: {0:?}")]
    SlotNotFound(SlotId),

    /// Source must be an output and target an input
    #[error("Connections must run from an output slot to an input slot")]
    DirectionMismatch,

    /// Data input already has an incoming edge
    #[error("Slot already connected: {0:?}")]
    SlotAlreadyConnected(SlotId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// An attached contract rejected the connection
    #[error(transparent)]
    Contract(#[from] ContractViolation),
}
