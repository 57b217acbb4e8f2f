// SPDX-License-Identifier: MIT OR Apache-2.0
//! Concrete contract kinds built on the core [`crate::contract::Contract`] trait.

pub mod types;
pub mod kinds;
pub mod numeric;

pub use types::TypeContract;
pub use kinds::SlotKindContract;
pub use numeric::NumericContract;
