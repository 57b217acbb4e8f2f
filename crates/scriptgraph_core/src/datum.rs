// SPDX-License-Identifier: MIT OR Apache-2.0
//! Type-tagged, type-erased runtime values.
//!
//! A [`Datum`] is the single value representation used for node arguments,
//! call results, and slot contents. The tag set is closed and exhaustively
//! matched; natively-registered types are carried behind an opaque handle
//! tagged with their [`BehaviorTypeId`].

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Identifier for a natively-registered (reflected) type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BehaviorTypeId(pub Uuid);

impl BehaviorTypeId {
    /// Create a new random type ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BehaviorTypeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Type tag describing what a [`Datum`] holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatumType {
    /// No value (side-effect-only results)
    Unit,
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// String value
    String,
    /// A natively-registered type, identified by its registry ID
    Class(BehaviorTypeId),
}

impl DatumType {
    /// Check if this type is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Check if a value of this type can flow into a slot declared as `other`
    pub fn can_connect_to(&self, other: &DatumType) -> bool {
        // Same types can always connect
        if self == other {
            return true;
        }

        // Implicit numeric conversions
        matches!(
            (self, other),
            (Self::Int, Self::Float) | (Self::Float, Self::Int)
        )
    }
}

impl fmt::Display for DatumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "Unit"),
            Self::Bool => write!(f, "Bool"),
            Self::Int => write!(f, "Int"),
            Self::Float => write!(f, "Float"),
            Self::String => write!(f, "String"),
            Self::Class(id) => write!(f, "Class({})", id.0),
        }
    }
}

/// An opaque handle to a value of a natively-registered type.
///
/// The payload is an immutable, reference-counted native value; cloning the
/// handle is observationally a deep copy because nothing can mutate the
/// shared payload.
#[derive(Clone)]
pub struct ClassValue {
    type_id: BehaviorTypeId,
    value: Arc<dyn Any + Send + Sync>,
}

impl ClassValue {
    /// Wrap a native value under the given registered type ID
    pub fn new<T: Any + Send + Sync>(type_id: BehaviorTypeId, value: T) -> Self {
        Self {
            type_id,
            value: Arc::new(value),
        }
    }

    /// The registered type this value belongs to
    pub fn type_id(&self) -> BehaviorTypeId {
        self.type_id
    }

    /// Borrow the payload as a concrete native type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassValue")
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}

/// A type-tagged, type-erased runtime value.
///
/// The tag is fixed at construction and never changes; conversion to a
/// native call parameter is a read-only borrow of the datum, never a copy.
#[derive(Debug, Clone)]
pub enum Datum {
    /// No value
    Unit,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
    /// Value of a natively-registered type
    Class(ClassValue),
}

impl Datum {
    /// Wrap a native value under a registered type ID
    pub fn class<T: Any + Send + Sync>(type_id: BehaviorTypeId, value: T) -> Self {
        Self::Class(ClassValue::new(type_id, value))
    }

    /// Get the type tag for this datum
    pub fn datum_type(&self) -> DatumType {
        match self {
            Self::Unit => DatumType::Unit,
            Self::Bool(_) => DatumType::Bool,
            Self::Int(_) => DatumType::Int,
            Self::Float(_) => DatumType::Float,
            Self::String(_) => DatumType::String,
            Self::Class(value) => DatumType::Class(value.type_id()),
        }
    }

    /// Get the boolean payload, if this is a `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Get the integer payload, if this is an `Int`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Get the float payload, if this is a `Float`
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Get the string payload, if this is a `String`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the payload of a `Class` datum as a concrete native type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Class(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            // Opaque payloads compare by identity
            (Self::Class(a), Self::Class(b)) => {
                a.type_id() == b.type_id() && Arc::ptr_eq(&a.value, &b.value)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_is_fixed_at_construction() {
        let datum = Datum::Int(5);
        assert_eq!(datum.datum_type(), DatumType::Int);
        let copy = datum.clone();
        assert_eq!(copy.datum_type(), DatumType::Int);
        assert_eq!(copy, datum);
    }

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(Datum::Bool(true).as_bool(), Some(true));
        assert_eq!(Datum::Int(42).as_int(), Some(42));
        assert_eq!(Datum::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Datum::String("hi".into()).as_str(), Some("hi"));
        // Cross-tag access never coerces
        assert_eq!(Datum::Int(1).as_bool(), None);
        assert_eq!(Datum::Bool(true).as_int(), None);
    }

    #[test]
    fn test_class_downcast() {
        let type_id = BehaviorTypeId::new();
        let datum = Datum::class(type_id, vec![1u32, 2, 3]);
        assert_eq!(datum.datum_type(), DatumType::Class(type_id));
        assert_eq!(datum.downcast_ref::<Vec<u32>>(), Some(&vec![1u32, 2, 3]));
        assert!(datum.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_type_connectability() {
        assert!(DatumType::Int.can_connect_to(&DatumType::Int));
        assert!(DatumType::Int.can_connect_to(&DatumType::Float));
        assert!(DatumType::Float.can_connect_to(&DatumType::Int));
        assert!(!DatumType::Int.can_connect_to(&DatumType::String));
        let a = BehaviorTypeId::new();
        let b = BehaviorTypeId::new();
        assert!(DatumType::Class(a).can_connect_to(&DatumType::Class(a)));
        assert!(!DatumType::Class(a).can_connect_to(&DatumType::Class(b)));
    }
}
