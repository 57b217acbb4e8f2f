// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declared-type compatibility contract.

use crate::contract::Contract;
use crate::slot::Slot;

/// Rejects a connection whose endpoint data types are not connectable.
///
/// Execution pins carry no data type and are outside this contract's
/// concern; pairing rules for them belong to [`super::SlotKindContract`].
#[derive(Debug, Default)]
pub struct TypeContract;

impl TypeContract {
    /// Create a new type contract
    pub fn new() -> Self {
        Self
    }
}

impl Contract for TypeContract {
    fn name(&self) -> &'static str {
        "TypeContract"
    }

    fn on_evaluate(&self, source: &Slot, target: &Slot) -> Result<(), String> {
        let (Some(source_type), Some(target_type)) = (source.data_type(), target.data_type())
        else {
            return Ok(());
        };

        if source_type.can_connect_to(target_type) {
            Ok(())
        } else {
            Err(format!(
                "source type {source_type} is not connectable to target type {target_type}"
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::DatumType;
    use crate::node::NodeId;

    #[test]
    fn test_matching_types_accepted() {
        let source = Slot::data_output(NodeId::new(), "Out", DatumType::Int);
        let target = Slot::data_input(NodeId::new(), "In", DatumType::Int);
        assert!(TypeContract.evaluate(&source, &target).is_ok());
    }

    #[test]
    fn test_implicit_numeric_conversion_accepted() {
        let source = Slot::data_output(NodeId::new(), "Out", DatumType::Int);
        let target = Slot::data_input(NodeId::new(), "In", DatumType::Float);
        assert!(TypeContract.evaluate(&source, &target).is_ok());
    }

    #[test]
    fn test_mismatch_names_both_types() {
        let source = Slot::data_output(NodeId::new(), "Out", DatumType::String);
        let target = Slot::data_input(NodeId::new(), "In", DatumType::Bool);
        let message = TypeContract.evaluate(&source, &target).unwrap_err();
        assert!(message.contains("String"));
        assert!(message.contains("Bool"));
    }
}
