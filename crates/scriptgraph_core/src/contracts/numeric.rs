// SPDX-License-Identifier: MIT OR Apache-2.0
//! Numeric-operand contract for math nodes.

use crate::contract::Contract;
use crate::slot::Slot;

/// Rejects a connection unless both endpoints are numeric data slots.
///
/// Attached to the operand inputs of math nodes, which accept `Int` or
/// `Float` but nothing else.
#[derive(Debug, Default)]
pub struct NumericContract;

impl NumericContract {
    /// Create a new numeric-operand contract
    pub fn new() -> Self {
        Self
    }
}

impl Contract for NumericContract {
    fn name(&self) -> &'static str {
        "NumericContract"
    }

    fn on_evaluate(&self, source: &Slot, target: &Slot) -> Result<(), String> {
        for slot in [source, target] {
            match slot.data_type() {
                Some(datum_type) if datum_type.is_numeric() => {}
                Some(datum_type) => {
                    return Err(format!(
                        "slot \"{}\" has non-numeric type {datum_type}",
                        slot.name
                    ));
                }
                None => {
                    return Err(format!("slot \"{}\" is an execution pin", slot.name));
                }
            }
        }
        Ok(())
    }
}
