// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot-compatibility contract: directions and pin kinds must pair.

use crate::contract::Contract;
use crate::slot::{Slot, SlotDirection};

/// Rejects connections whose endpoints cannot pair structurally:
/// the source must be an output, the target an input, and execution pins
/// only connect to execution pins (data slots only to data slots).
#[derive(Debug, Default)]
pub struct SlotKindContract;

impl SlotKindContract {
    /// Create a new slot-compatibility contract
    pub fn new() -> Self {
        Self
    }
}

impl Contract for SlotKindContract {
    fn name(&self) -> &'static str {
        "SlotKindContract"
    }

    fn on_evaluate(&self, source: &Slot, target: &Slot) -> Result<(), String> {
        if source.direction != SlotDirection::Output {
            return Err(format!("source slot \"{}\" is not an output", source.name));
        }
        if target.direction != SlotDirection::Input {
            return Err(format!("target slot \"{}\" is not an input", target.name));
        }
        if source.is_execution() != target.is_execution() {
            return Err(format!(
                "slot \"{}\" and slot \"{}\" mix execution and data pins",
                source.name, target.name
            ));
        }
        Ok(())
    }
}
