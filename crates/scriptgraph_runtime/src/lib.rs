// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime bridge for `ScriptGraph`.
//!
//! This crate lets the node executor invoke natively-registered functions
//! discovered through a reflection registry:
//! - [`registry`] — behavior classes, method descriptors, and per-call-site
//!   resolution caching
//! - [`bridge`] — parameter marshalling, arity checking, multi-result
//!   (tuple) extraction, and nested-outcome unwrapping
//! - [`execution`] — the per-step value frame the bridge writes results
//!   into, plus the reentrancy guard
//!
//! All failures are recovered at the component boundary into a
//! [`bridge::CallResult`]; nothing here terminates the hosting process.

pub mod registry;
pub mod bridge;
pub mod execution;

pub use registry::{
    BehaviorClass, BehaviorMethod, BehaviorRegistry, MethodCallSite, OutcomeSupport,
};
pub use bridge::{BridgeError, CallResult, CallStatus};
pub use execution::{ExecutionFrame, ReentrancyError};
