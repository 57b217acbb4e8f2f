// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data model for `ScriptGraph`.
//!
//! This crate provides the data model shared by the editor and the runtime:
//! - Type-tagged, type-erased runtime values ([`Datum`])
//! - Typed input/output and execution slots
//! - Connection management with contract-based validation
//!
//! ## Architecture
//!
//! Nodes own slots; slots carry attached [`contract::ContractDescriptor`]s.
//! When an edge is authored, [`Graph::connect`] instantiates each attached
//! contract and evaluates it against the (source, target) slot pair,
//! fail-fast. No value ever flows across an edge that was not accepted.

pub mod contract;
pub mod contracts;
pub mod datum;
pub mod slot;
pub mod node;
pub mod connection;
pub mod graph;

pub use contract::{Contract, ContractDescriptor, ContractViolation};
pub use datum::{BehaviorTypeId, ClassValue, Datum, DatumType};
pub use slot::{Slot, SlotDirection, SlotId, SlotKind};
pub use node::{Node, NodeId};
pub use connection::{Connection, ConnectionId};
pub use graph::Graph;
