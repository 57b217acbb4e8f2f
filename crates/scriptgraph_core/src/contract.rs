// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection contracts.
//!
//! A contract is a pluggable predicate deciding whether a proposed
//! slot-to-slot connection is legal. Contracts are stateless and pure with
//! respect to the graph: evaluation mutates nothing, so identical inputs
//! always produce identical verdicts.

use crate::slot::Slot;
use std::fmt;

/// A predicate validating a proposed connection between two slots.
///
/// The public entry point is [`Contract::evaluate`]; concrete kinds
/// implement [`Contract::on_evaluate`]. The wrapper performs no logic
/// beyond dispatch.
pub trait Contract {
    /// Human-readable contract kind name, used in diagnostics
    fn name(&self) -> &'static str;

    /// Decide whether the connection `source -> target` is legal
    fn on_evaluate(&self, source: &Slot, target: &Slot) -> Result<(), String>;

    /// Evaluate the connection `source -> target`
    fn evaluate(&self, source: &Slot, target: &Slot) -> Result<(), String> {
        self.on_evaluate(source, target)
    }
}

/// Function invoked at connection time to produce a fresh contract instance
pub type ContractCreationFn = Box<dyn Fn() -> Box<dyn Contract> + Send + Sync>;

/// An inert factory producing a fresh [`Contract`] on demand.
///
/// Descriptors are stored in a slot's configuration when the slot is
/// authored and are not invoked until a connection is attempted, so
/// contract state never outlives a single evaluation.
pub struct ContractDescriptor {
    create: ContractCreationFn,
}

impl ContractDescriptor {
    /// Create a descriptor from a contract constructor
    pub fn new<C, F>(create: F) -> Self
    where
        C: Contract + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self {
            create: Box::new(move || Box::new(create())),
        }
    }

    /// Produce a fresh contract instance
    pub fn create(&self) -> Box<dyn Contract> {
        (self.create)()
    }
}

impl fmt::Debug for ContractDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractDescriptor").finish_non_exhaustive()
    }
}

/// A rejected connection, carrying the failing contract's verdict
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ContractViolation {
    /// Kind name of the contract that rejected the connection
    pub contract: &'static str,
    /// The failure message, as produced by the contract
    pub message: String,
}

/// Evaluate every contract attached to the endpoints of a proposed
/// connection, in declared order (source slot's contracts first).
///
/// Stops at the first failure and surfaces only that failure's message;
/// the connection is legal only if every contract accepts it.
pub fn evaluate_connection(source: &Slot, target: &Slot) -> Result<(), ContractViolation> {
    for descriptor in source.contracts().iter().chain(target.contracts()) {
        let contract = descriptor.create();
        if let Err(message) = contract.evaluate(source, target) {
            return Err(ContractViolation {
                contract: contract.name(),
                message,
            });
        }
    }
    Ok(())
}
