// SPDX-License-Identifier: MIT OR Apache-2.0
//! Method invocation bridge.
//!
//! Resolves a reflected method, marshals borrowed parameters, issues the
//! native call, and unwraps its results into the execution frame. Every
//! failure is recovered here into a [`CallResult`] carrying a status and a
//! diagnostic message; the bridge holds no state across invocations.

use crate::execution::ExecutionFrame;
use crate::registry::{BehaviorClass, BehaviorMethod, BehaviorRegistry};
use scriptgraph_core::{BehaviorTypeId, Datum, DatumType, Node, SlotId};

/// Upper bound on marshalled parameters per call
pub const MAX_PARAMETERS: usize = 40;

/// The execution-out pin followed when a method names no override
pub const DEFAULT_EXECUTION_OUT: &str = "Out";

/// Status of an invocation attempt.
///
/// Monotonic within one invocation: it only ever advances
/// `NotAttempted` → `Attempted` → {`Failed`, `Succeeded`}, never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CallStatus {
    /// The native call was never issued (arity or marshalling refusal)
    NotAttempted,
    /// An invocation strategy performed the call; outcome pending
    Attempted,
    /// The call was issued and failed
    Failed,
    /// The call was issued and succeeded
    Succeeded,
}

/// The outcome of an invocation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    /// Invocation status
    pub status: CallStatus,
    /// Which execution-out pin the executor should follow next
    pub execution_out: String,
    /// Recovered diagnostic, present on refusals and failures
    pub message: Option<String>,
}

impl CallResult {
    /// Create a result with the default execution-out pin and no message
    pub fn new(status: CallStatus) -> Self {
        Self {
            status,
            execution_out: DEFAULT_EXECUTION_OUT.to_string(),
            message: None,
        }
    }

    /// Override the execution-out pin
    pub fn with_execution_out(mut self, pin: impl Into<String>) -> Self {
        self.execution_out = pin.into();
        self
    }

    /// Attach a diagnostic message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Check if the invocation succeeded
    pub fn succeeded(&self) -> bool {
        self.status == CallStatus::Succeeded
    }
}

/// Failure taxonomy of the invocation bridge.
///
/// None of these are process-fatal; each is recovered at the bridge
/// boundary into a [`CallResult`] status plus this error's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The receiver's type has no registered behavior class
    #[error("no behavior class registered for the receiver of \"{method}\"")]
    ClassNotFound {
        /// Method that was being resolved
        method: String,
    },

    /// Name lookup missed in the owning type's method mapping
    #[error("method \"{method}\" not found on class \"{class}\"")]
    MethodNotFound {
        /// Owning class name
        class: String,
        /// Requested method name
        method: String,
    },

    /// Supplied argument count differs from the declared count
    #[error("{method} expects {expected} arguments but was called with {actual}")]
    ArityMismatch {
        /// Target method name
        method: String,
        /// Declared argument count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Parameter list exceeds the fixed marshalling buffer
    #[error("parameter list has {actual} entries, exceeding the marshalling limit")]
    TooManyParameters {
        /// Number of parameters supplied
        actual: usize,
    },

    /// The native call reported failure
    #[error("native call to {method} failed")]
    InvocationFailure {
        /// Target method name
        method: String,
    },

    /// A tuple accessor does not take the aggregate as its only argument
    #[error("tuple accessor \"{method}\" must take the aggregate as its only argument")]
    AccessorArity {
        /// Accessor method name
        method: String,
    },

    /// Declared tuple arity differs from the supplied result slot count
    #[error("{method} produces a tuple of {expected} elements but {actual} result slots were supplied")]
    TupleArityMismatch {
        /// Target method name
        method: String,
        /// Declared tuple arity
        expected: usize,
        /// Supplied result slot count
        actual: usize,
    },

    /// A two-state result denoted failure; carries the inner error text
    #[error("{message}")]
    OutcomeFailure {
        /// The inner error message, verbatim
        message: String,
    },

    /// Nested-outcome flattening could not retrieve an inner value
    #[error("could not unwrap the outcome result of {method}: {reason}")]
    OutcomeUnwrapFailure {
        /// Method whose result was being unwrapped
        method: String,
        /// Why the unwrap was refused
        reason: String,
    },
}

/// Resolve and invoke a reflected method for a node.
///
/// Resolution is by name within the owning type's registered-method
/// mapping; a miss is surfaced as `Failed` and no call is attempted. When
/// more than one result slot is supplied, the multiple-results (tuple)
/// strategy is tried before the generic single-result path; if it reports
/// it was attempted, its outcome takes precedence. Result datums are
/// written into `frame`; the returned [`CallResult`] names the
/// execution-out pin the executor should follow.
pub fn call(
    frame: &mut ExecutionFrame,
    registry: &BehaviorRegistry,
    node: &Node,
    type_id: BehaviorTypeId,
    method_name: &str,
    arguments: &[Datum],
    result_slots: &[SlotId],
) -> CallResult {
    tracing::trace!(node = %node.name, method = method_name, "invoking reflected method");

    let Some(method) = registry.resolve_method(type_id, method_name) else {
        let error = match registry.class(type_id) {
            Some(class) => BridgeError::MethodNotFound {
                class: class.name().to_string(),
                method: method_name.to_string(),
            },
            None => BridgeError::ClassNotFound {
                method: method_name.to_string(),
            },
        };
        tracing::error!(node = %node.name, "{error}");
        return CallResult::new(CallStatus::Failed).with_message(error.to_string());
    };

    let parameters = match create_parameter_list(None, arguments) {
        Ok(parameters) => parameters,
        Err(error) => {
            tracing::error!(node = %node.name, "{error}");
            return CallResult::new(CallStatus::NotAttempted).with_message(error.to_string());
        }
    };

    call_generic(node, method, &parameters, |method, parameters| {
        if result_slots.len() > 1 {
            let tuple = attempt_call_with_tuple_results(
                frame,
                registry,
                method,
                parameters,
                result_slots,
            )?;
            if tuple.status == CallStatus::Attempted {
                return Ok(tuple);
            }
        }
        attempt_call_with_result(frame, registry, method, parameters, result_slots.first().copied())
    })
}

/// Arity-check, then drive an invocation strategy to a final status.
///
/// A strategy reporting `Attempted` is promoted to `Succeeded` with its
/// execution-out pin; `NotAttempted` (no result declared) falls back to
/// issuing the call for its side effect only.
fn call_generic<F>(
    node: &Node,
    method: &BehaviorMethod,
    parameters: &[&Datum],
    attempt: F,
) -> CallResult
where
    F: FnOnce(&BehaviorMethod, &[&Datum]) -> Result<CallResult, BridgeError>,
{
    let expected = method.argument_count();
    if parameters.len() != expected {
        let error = BridgeError::ArityMismatch {
            method: method.name().to_string(),
            expected,
            actual: parameters.len(),
        };
        tracing::error!(node = %node.name, "{error}");
        return CallResult::new(CallStatus::NotAttempted).with_message(error.to_string());
    }

    match attempt(method, parameters) {
        Err(error) => {
            tracing::error!(node = %node.name, method = method.name(), "{error}");
            CallResult::new(CallStatus::Failed).with_message(error.to_string())
        }
        Ok(result) if result.status == CallStatus::Attempted => CallResult {
            status: CallStatus::Succeeded,
            ..result
        },
        Ok(_) => {
            if method.invoke(parameters).is_some() {
                CallResult::new(CallStatus::Succeeded)
            } else {
                let error = BridgeError::InvocationFailure {
                    method: method.name().to_string(),
                };
                tracing::error!(node = %node.name, "{error}");
                CallResult::new(CallStatus::Failed).with_message(error.to_string())
            }
        }
    }
}

/// Single-result strategy: issue the call, unwrap a two-state result, and
/// populate the result slot.
///
/// Reports `NotAttempted` when the method declares no result, so the
/// caller can fall back to a side-effect-only call.
fn attempt_call_with_result(
    frame: &mut ExecutionFrame,
    registry: &BehaviorRegistry,
    method: &BehaviorMethod,
    parameters: &[&Datum],
    result_slot: Option<SlotId>,
) -> Result<CallResult, BridgeError> {
    if !method.has_result() {
        return Ok(CallResult::new(CallStatus::NotAttempted));
    }

    let result = method.invoke(parameters).ok_or_else(|| BridgeError::InvocationFailure {
        method: method.name().to_string(),
    })?;
    let result = unpack_outcome_success(registry, method.name(), result)?;

    if let Some(slot) = result_slot {
        frame.set_value(slot, result);
    }

    let mut call = CallResult::new(CallStatus::Attempted);
    if let Some(pin) = method.execution_out() {
        call = call.with_execution_out(pin);
    }
    Ok(call)
}

/// Multiple-results strategy: flatten a tuple-like aggregate result into
/// one slot per element.
///
/// Reports `NotAttempted` when the declared result type has no registered
/// tuple accessors, so the caller can fall back to the single-result path
/// without any call having been issued. Accessors run in ascending index
/// order, one invocation per tuple position.
fn attempt_call_with_tuple_results(
    frame: &mut ExecutionFrame,
    registry: &BehaviorRegistry,
    method: &BehaviorMethod,
    parameters: &[&Datum],
    result_slots: &[SlotId],
) -> Result<CallResult, BridgeError> {
    let Some(DatumType::Class(result_type)) = method.result_type() else {
        return Ok(CallResult::new(CallStatus::NotAttempted));
    };

    let accessors = registry.resolve_tuple_accessors(*result_type);
    if accessors.is_empty() {
        return Ok(CallResult::new(CallStatus::NotAttempted));
    }
    if accessors.len() != result_slots.len() {
        return Err(BridgeError::TupleArityMismatch {
            method: method.name().to_string(),
            expected: accessors.len(),
            actual: result_slots.len(),
        });
    }

    let result = method.invoke(parameters).ok_or_else(|| BridgeError::InvocationFailure {
        method: method.name().to_string(),
    })?;

    for ((_, accessor), slot) in accessors.into_iter().zip(result_slots) {
        let element = call_tuple_get_method(accessor, &result)?;
        frame.set_value(*slot, element);
    }

    let mut call = CallResult::new(CallStatus::Attempted);
    if let Some(pin) = method.execution_out() {
        call = call.with_execution_out(pin);
    }
    Ok(call)
}

/// Invoke a tuple accessor with the aggregate as its only parameter
fn call_tuple_get_method(
    method: &BehaviorMethod,
    aggregate: &Datum,
) -> Result<Datum, BridgeError> {
    if method.argument_count() != 1 {
        return Err(BridgeError::AccessorArity {
            method: method.name().to_string(),
        });
    }
    let parameters = [aggregate];
    method.invoke(&parameters).ok_or_else(|| BridgeError::InvocationFailure {
        method: method.name().to_string(),
    })
}

/// Invoke a method on a datum's own class, with the datum as the implicit
/// first parameter
pub fn call_method_on_datum(
    registry: &BehaviorRegistry,
    input: &Datum,
    method_name: &str,
    arguments: &[&Datum],
) -> Result<Datum, BridgeError> {
    let DatumType::Class(type_id) = input.datum_type() else {
        return Err(BridgeError::ClassNotFound {
            method: method_name.to_string(),
        });
    };
    let class = registry.class(type_id).ok_or_else(|| BridgeError::ClassNotFound {
        method: method_name.to_string(),
    })?;
    let method = class.method(method_name).ok_or_else(|| BridgeError::MethodNotFound {
        class: class.name().to_string(),
        method: method_name.to_string(),
    })?;

    let parameters = create_parameter_list(Some(input), arguments.iter().copied())?;
    if parameters.len() != method.argument_count() {
        return Err(BridgeError::ArityMismatch {
            method: method_name.to_string(),
            expected: method.argument_count(),
            actual: parameters.len(),
        });
    }

    method.invoke(&parameters).ok_or_else(|| BridgeError::InvocationFailure {
        method: method_name.to_string(),
    })
}

/// Build the ordered, borrowed parameter list for one call.
///
/// The receiver, when present, occupies the first position. The list
/// borrows externally-owned argument storage and must not outlive it.
fn create_parameter_list<'d>(
    receiver: Option<&'d Datum>,
    arguments: impl IntoIterator<Item = &'d Datum>,
) -> Result<Vec<&'d Datum>, BridgeError> {
    let parameters: Vec<&Datum> = receiver.into_iter().chain(arguments).collect();
    if parameters.len() > MAX_PARAMETERS {
        return Err(BridgeError::TooManyParameters {
            actual: parameters.len(),
        });
    }
    Ok(parameters)
}

/// Flatten a two-state success/error result, one nesting level deep.
///
/// Non-outcome results pass through untouched. An inner failure surfaces
/// its error text verbatim; an inner success is replaced by its retrieved
/// value. A success value that is itself an outcome is refused rather than
/// unwrapped further.
fn unpack_outcome_success(
    registry: &BehaviorRegistry,
    method_name: &str,
    result: Datum,
) -> Result<Datum, BridgeError> {
    let DatumType::Class(type_id) = result.datum_type() else {
        return Ok(result);
    };
    let Some(support) = registry.class(type_id).and_then(BehaviorClass::outcome_support) else {
        return Ok(result);
    };

    let is_success = call_method_on_datum(registry, &result, &support.is_success, &[])?;
    match is_success.as_bool() {
        Some(false) => {
            let error = call_method_on_datum(registry, &result, &support.get_error, &[])?;
            let Some(message) = error.as_str() else {
                return Err(BridgeError::OutcomeUnwrapFailure {
                    method: method_name.to_string(),
                    reason: format!("{} did not return String", support.get_error),
                });
            };
            Err(BridgeError::OutcomeFailure {
                message: message.to_string(),
            })
        }
        Some(true) => {
            let value = call_method_on_datum(registry, &result, &support.get_value, &[])?;
            if let DatumType::Class(inner) = value.datum_type() {
                if registry.class(inner).and_then(BehaviorClass::outcome_support).is_some() {
                    return Err(BridgeError::OutcomeUnwrapFailure {
                        method: method_name.to_string(),
                        reason: "success value is itself an outcome".to_string(),
                    });
                }
            }
            Ok(value)
        }
        None => Err(BridgeError::OutcomeUnwrapFailure {
            method: method_name.to_string(),
            reason: format!("{} did not return Bool", support.is_success),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{BehaviorMethod, OutcomeSupport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn add_method(calls: Arc<AtomicUsize>) -> BehaviorMethod {
        BehaviorMethod::new(
            "Add",
            2,
            Some(DatumType::Int),
            Box::new(move |parameters| {
                calls.fetch_add(1, Ordering::Relaxed);
                let a = parameters[0].as_int()?;
                let b = parameters[1].as_int()?;
                Some(Datum::Int(a + b))
            }),
        )
    }

    fn math_registry() -> (BehaviorRegistry, BehaviorTypeId, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = BehaviorRegistry::new();
        let class = BehaviorClass::new("MathOps").with_method(add_method(Arc::clone(&calls)));
        let type_id = registry.register(class);
        (registry, type_id, calls)
    }

    /// Registry with an outcome class and a `Div` method returning it
    fn outcome_registry() -> (BehaviorRegistry, BehaviorTypeId) {
        let mut registry = BehaviorRegistry::new();

        let mut outcome = BehaviorClass::new("DivOutcome")
            .with_outcome_support(OutcomeSupport::default());
        let outcome_ty = outcome.type_id();
        outcome.add_method(BehaviorMethod::new(
            "IsSuccess",
            1,
            Some(DatumType::Bool),
            Box::new(|parameters| {
                let inner = parameters[0].downcast_ref::<Result<i64, String>>()?;
                Some(Datum::Bool(inner.is_ok()))
            }),
        ));
        outcome.add_method(BehaviorMethod::new(
            "GetValue",
            1,
            Some(DatumType::Int),
            Box::new(|parameters| {
                let inner = parameters[0].downcast_ref::<Result<i64, String>>()?;
                inner.as_ref().ok().map(|value| Datum::Int(*value))
            }),
        ));
        outcome.add_method(BehaviorMethod::new(
            "GetError",
            1,
            Some(DatumType::String),
            Box::new(|parameters| {
                let inner = parameters[0].downcast_ref::<Result<i64, String>>()?;
                inner.as_ref().err().map(|error| Datum::String(error.clone()))
            }),
        ));
        registry.register(outcome);

        let math = BehaviorClass::new("MathOps").with_method(BehaviorMethod::new(
            "Div",
            2,
            Some(DatumType::Class(outcome_ty)),
            Box::new(move |parameters| {
                let a = parameters[0].as_int()?;
                let b = parameters[1].as_int()?;
                let result: Result<i64, String> = if b == 0 {
                    Err("divide by zero".to_string())
                } else {
                    Ok(a / b)
                };
                Some(Datum::class(outcome_ty, result))
            }),
        ));
        let math_ty = registry.register(math);
        (registry, math_ty)
    }

    #[test]
    fn test_add_succeeds_with_default_out() {
        let (registry, type_id, _) = math_registry();
        let mut frame = ExecutionFrame::new();
        let node = Node::new("Add");
        let result_slot = SlotId::new();

        let result = call(
            &mut frame,
            &registry,
            &node,
            type_id,
            "Add",
            &[Datum::Int(2), Datum::Int(3)],
            &[result_slot],
        );

        assert_eq!(result.status, CallStatus::Succeeded);
        assert_eq!(result.execution_out, DEFAULT_EXECUTION_OUT);
        assert_eq!(frame.value(result_slot), Some(&Datum::Int(5)));
    }

    #[test]
    fn test_arity_mismatch_is_not_attempted() {
        let (registry, type_id, calls) = math_registry();
        let mut frame = ExecutionFrame::new();
        let node = Node::new("Add");

        let result = call(
            &mut frame,
            &registry,
            &node,
            type_id,
            "Add",
            &[Datum::Int(2)],
            &[SlotId::new()],
        );

        assert_eq!(result.status, CallStatus::NotAttempted);
        let message = result.message.unwrap();
        assert!(message.contains("expects 2"));
        assert!(message.contains("called with 1"));
        // The native call was never issued
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_method_not_found_fails_without_calling() {
        let (registry, type_id, calls) = math_registry();
        let mut frame = ExecutionFrame::new();
        let node = Node::new("Add");

        let result = call(
            &mut frame,
            &registry,
            &node,
            type_id,
            "Subtract",
            &[Datum::Int(2), Datum::Int(3)],
            &[],
        );

        assert_eq!(result.status, CallStatus::Failed);
        assert!(result.message.unwrap().contains("not found"));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_unregistered_class_fails() {
        let registry = BehaviorRegistry::new();
        let mut frame = ExecutionFrame::new();
        let node = Node::new("Add");

        let result = call(
            &mut frame,
            &registry,
            &node,
            BehaviorTypeId::new(),
            "Add",
            &[],
            &[],
        );

        assert_eq!(result.status, CallStatus::Failed);
        assert!(result.message.unwrap().contains("no behavior class"));
    }

    #[test]
    fn test_side_effect_only_method_yields_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = BehaviorRegistry::new();
        let class = BehaviorClass::new("Logger").with_method(BehaviorMethod::new(
            "Log",
            1,
            None,
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                Some(Datum::Unit)
            }),
        ));
        let type_id = registry.register(class);

        let mut frame = ExecutionFrame::new();
        let node = Node::new("Log");
        let result = call(
            &mut frame,
            &registry,
            &node,
            type_id,
            "Log",
            &[Datum::String("hi".into())],
            &[],
        );

        assert_eq!(result.status, CallStatus::Succeeded);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(frame.value_count(), 0);
    }

    #[test]
    fn test_native_failure_is_failed() {
        let mut registry = BehaviorRegistry::new();
        let class = BehaviorClass::new("Flaky").with_method(BehaviorMethod::new(
            "Explode",
            0,
            None,
            Box::new(|_| None),
        ));
        let type_id = registry.register(class);

        let mut frame = ExecutionFrame::new();
        let node = Node::new("Explode");
        let result = call(&mut frame, &registry, &node, type_id, "Explode", &[], &[]);

        assert_eq!(result.status, CallStatus::Failed);
        assert!(result.message.unwrap().contains("native call"));
    }

    #[test]
    fn test_execution_out_override_on_success() {
        let mut registry = BehaviorRegistry::new();
        let class = BehaviorClass::new("Picker").with_method(
            BehaviorMethod::new(
                "Pick",
                0,
                Some(DatumType::Int),
                Box::new(|_| Some(Datum::Int(1))),
            )
            .with_execution_out("OnPicked"),
        );
        let type_id = registry.register(class);

        let mut frame = ExecutionFrame::new();
        let node = Node::new("Pick");
        let result = call(
            &mut frame,
            &registry,
            &node,
            type_id,
            "Pick",
            &[],
            &[SlotId::new()],
        );

        assert_eq!(result.status, CallStatus::Succeeded);
        assert_eq!(result.execution_out, "OnPicked");
    }

    #[test]
    fn test_outcome_failure_surfaces_inner_message() {
        let (registry, math_ty) = outcome_registry();
        let mut frame = ExecutionFrame::new();
        let node = Node::new("Div");
        let result_slot = SlotId::new();

        let result = call(
            &mut frame,
            &registry,
            &node,
            math_ty,
            "Div",
            &[Datum::Int(1), Datum::Int(0)],
            &[result_slot],
        );

        assert_eq!(result.status, CallStatus::Failed);
        assert_eq!(result.message.as_deref(), Some("divide by zero"));
        assert_eq!(frame.value(result_slot), None);

        // Repeating the call yields the identical verdict
        let repeat = call(
            &mut frame,
            &registry,
            &node,
            math_ty,
            "Div",
            &[Datum::Int(1), Datum::Int(0)],
            &[result_slot],
        );
        assert_eq!(repeat, result);
    }

    #[test]
    fn test_outcome_success_yields_unwrapped_value() {
        let (registry, math_ty) = outcome_registry();
        let mut frame = ExecutionFrame::new();
        let node = Node::new("Div");
        let result_slot = SlotId::new();

        let result = call(
            &mut frame,
            &registry,
            &node,
            math_ty,
            "Div",
            &[Datum::Int(10), Datum::Int(2)],
            &[result_slot],
        );

        assert_eq!(result.status, CallStatus::Succeeded);
        assert_eq!(frame.value(result_slot), Some(&Datum::Int(5)));
    }

    #[test]
    fn test_nested_outcome_is_refused() {
        let mut registry = BehaviorRegistry::new();

        // An outcome whose success value is another value of the same
        // outcome class: one unwrap level is allowed, the second refused.
        let mut outcome = BehaviorClass::new("NestedOutcome")
            .with_outcome_support(OutcomeSupport::default());
        let outcome_ty = outcome.type_id();
        outcome.add_method(BehaviorMethod::new(
            "IsSuccess",
            1,
            Some(DatumType::Bool),
            Box::new(|_| Some(Datum::Bool(true))),
        ));
        outcome.add_method(BehaviorMethod::new(
            "GetValue",
            1,
            Some(DatumType::Class(outcome_ty)),
            Box::new(move |_| Some(Datum::class(outcome_ty, ()))),
        ));
        outcome.add_method(BehaviorMethod::new(
            "GetError",
            1,
            Some(DatumType::String),
            Box::new(|_| Some(Datum::String(String::new()))),
        ));
        registry.register(outcome);

        let producer = BehaviorClass::new("Producer").with_method(BehaviorMethod::new(
            "Produce",
            0,
            Some(DatumType::Class(outcome_ty)),
            Box::new(move |_| Some(Datum::class(outcome_ty, ()))),
        ));
        let producer_ty = registry.register(producer);

        let mut frame = ExecutionFrame::new();
        let node = Node::new("Produce");
        let result = call(
            &mut frame,
            &registry,
            &node,
            producer_ty,
            "Produce",
            &[],
            &[SlotId::new()],
        );

        assert_eq!(result.status, CallStatus::Failed);
        assert!(result.message.unwrap().contains("could not unwrap"));
    }

    /// Registry with a pair-valued method and indexed tuple accessors
    fn tuple_registry(
        order: Arc<Mutex<Vec<usize>>>,
    ) -> (BehaviorRegistry, BehaviorTypeId) {
        let mut registry = BehaviorRegistry::new();

        let mut pair = BehaviorClass::new("IntPair");
        let pair_ty = pair.type_id();
        for index in 0..2 {
            let accessor_order = Arc::clone(&order);
            pair.add_method(BehaviorMethod::new(
                format!("Get{index}"),
                1,
                Some(DatumType::Int),
                Box::new(move |parameters| {
                    accessor_order.lock().unwrap().push(index);
                    let (a, b) = parameters[0].downcast_ref::<(i64, i64)>()?;
                    Some(Datum::Int(if index == 0 { *a } else { *b }))
                }),
            ));
            pair.set_tuple_accessor(index, format!("Get{index}"));
        }
        registry.register(pair);

        let math = BehaviorClass::new("MathOps").with_method(BehaviorMethod::new(
            "MinMax",
            2,
            Some(DatumType::Class(pair_ty)),
            Box::new(move |parameters| {
                let a = parameters[0].as_int()?;
                let b = parameters[1].as_int()?;
                Some(Datum::class(pair_ty, (a.min(b), a.max(b))))
            }),
        ));
        let math_ty = registry.register(math);
        (registry, math_ty)
    }

    #[test]
    fn test_tuple_results_populate_each_slot_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (registry, math_ty) = tuple_registry(Arc::clone(&order));
        let mut frame = ExecutionFrame::new();
        let node = Node::new("MinMax");
        let slots = [SlotId::new(), SlotId::new()];

        let result = call(
            &mut frame,
            &registry,
            &node,
            math_ty,
            "MinMax",
            &[Datum::Int(9), Datum::Int(4)],
            &slots,
        );

        assert_eq!(result.status, CallStatus::Succeeded);
        assert_eq!(frame.value(slots[0]), Some(&Datum::Int(4)));
        assert_eq!(frame.value(slots[1]), Some(&Datum::Int(9)));
        // Exactly one accessor invocation per position, ascending
        assert_eq!(*order.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_tuple_slot_count_mismatch_fails() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (registry, math_ty) = tuple_registry(order);
        let mut frame = ExecutionFrame::new();
        let node = Node::new("MinMax");
        let slots = [SlotId::new(), SlotId::new(), SlotId::new()];

        let result = call(
            &mut frame,
            &registry,
            &node,
            math_ty,
            "MinMax",
            &[Datum::Int(9), Datum::Int(4)],
            &slots,
        );

        assert_eq!(result.status, CallStatus::Failed);
        assert!(result.message.unwrap().contains("result slots"));
        assert_eq!(frame.value_count(), 0);
    }

    #[test]
    fn test_multiple_slots_fall_back_to_single_result() {
        // Two result slots requested, but the result type declares no
        // accessors: the single-result path populates the first slot.
        let (registry, type_id, calls) = math_registry();
        let mut frame = ExecutionFrame::new();
        let node = Node::new("Add");
        let slots = [SlotId::new(), SlotId::new()];

        let result = call(
            &mut frame,
            &registry,
            &node,
            type_id,
            "Add",
            &[Datum::Int(2), Datum::Int(3)],
            &slots,
        );

        assert_eq!(result.status, CallStatus::Succeeded);
        assert_eq!(frame.value(slots[0]), Some(&Datum::Int(5)));
        assert_eq!(frame.value(slots[1]), None);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_parameter_limit_refused_before_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = BehaviorRegistry::new();
        let class = BehaviorClass::new("Wide").with_method(BehaviorMethod::new(
            "Sink",
            MAX_PARAMETERS + 1,
            None,
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                Some(Datum::Unit)
            }),
        ));
        let type_id = registry.register(class);

        let arguments: Vec<Datum> = (0..=MAX_PARAMETERS as i64).map(Datum::Int).collect();
        let mut frame = ExecutionFrame::new();
        let node = Node::new("Sink");
        let result = call(&mut frame, &registry, &node, type_id, "Sink", &arguments, &[]);

        assert_eq!(result.status, CallStatus::NotAttempted);
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_call_method_on_datum_uses_implicit_receiver() {
        let (registry, math_ty) = outcome_registry();
        let method = registry.resolve_method(math_ty, "Div").unwrap();
        let args = [Datum::Int(6), Datum::Int(3)];
        let params: Vec<&Datum> = args.iter().collect();
        let outcome = method.invoke(&params).unwrap();

        // The datum is marshalled as the implicit first parameter
        let answer = call_method_on_datum(&registry, &outcome, "IsSuccess", &[]).unwrap();
        assert_eq!(answer, Datum::Bool(true));

        let missing = call_method_on_datum(&registry, &outcome, "Missing", &[]);
        assert!(matches!(missing, Err(BridgeError::MethodNotFound { .. })));
    }

    #[test]
    fn test_status_ordering_is_monotonic() {
        assert!(CallStatus::NotAttempted < CallStatus::Attempted);
        assert!(CallStatus::Attempted < CallStatus::Failed);
        assert!(CallStatus::Attempted < CallStatus::Succeeded);
    }
}
