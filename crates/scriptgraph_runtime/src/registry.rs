// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reflection registry: behavior classes and method descriptors.
//!
//! The registry maps a (type identifier, method name) pair to an immutable
//! method descriptor. Lookups never mutate; every mutation bumps a revision
//! counter so lazily-populated call-site caches always observe registry
//! changes made between registration and use.

use indexmap::IndexMap;
use scriptgraph_core::{BehaviorTypeId, Datum, DatumType};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;

/// Native entry point over a contiguous, borrowed parameter array.
///
/// Returns `None` on native failure; panics are not used as control flow.
/// A method with no declared result produces [`Datum::Unit`] on success.
pub type MethodEntry = Box<dyn Fn(&[&Datum]) -> Option<Datum> + Send + Sync>;

/// Registry metadata describing a callable native function
pub struct BehaviorMethod {
    name: String,
    arity: usize,
    result: Option<DatumType>,
    execution_out: Option<String>,
    entry: MethodEntry,
}

impl BehaviorMethod {
    /// Create a method descriptor
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        result: Option<DatumType>,
        entry: MethodEntry,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            result,
            execution_out: None,
            entry,
        }
    }

    /// Name the execution-out pin a successful with-results call follows
    pub fn with_execution_out(mut self, pin: impl Into<String>) -> Self {
        self.execution_out = Some(pin.into());
        self
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared argument count, including any implicit receiver
    pub fn argument_count(&self) -> usize {
        self.arity
    }

    /// Whether the method declares a result
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// Declared result type, if any
    pub fn result_type(&self) -> Option<&DatumType> {
        self.result.as_ref()
    }

    /// Execution-out pin override, if the method declares one
    pub fn execution_out(&self) -> Option<&str> {
        self.execution_out.as_deref()
    }

    /// Issue the native call over a positionally-aligned parameter array.
    ///
    /// The borrowed parameter storage must remain valid for the duration of
    /// the call; nothing is retained past it.
    pub fn invoke(&self, parameters: &[&Datum]) -> Option<Datum> {
        (self.entry)(parameters)
    }
}

impl fmt::Debug for BehaviorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorMethod")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("result", &self.result)
            .field("execution_out", &self.execution_out)
            .finish_non_exhaustive()
    }
}

/// Names of the probe methods that make a class a two-state outcome value
#[derive(Debug, Clone)]
pub struct OutcomeSupport {
    /// Method returning `Bool`: does the value denote success?
    pub is_success: String,
    /// Method retrieving the success payload
    pub get_value: String,
    /// Method retrieving the error message as `String`
    pub get_error: String,
}

impl Default for OutcomeSupport {
    fn default() -> Self {
        Self {
            is_success: "IsSuccess".to_string(),
            get_value: "GetValue".to_string(),
            get_error: "GetError".to_string(),
        }
    }
}

/// A natively-registered type and its reflected methods
#[derive(Debug)]
pub struct BehaviorClass {
    type_id: BehaviorTypeId,
    name: String,
    methods: IndexMap<String, BehaviorMethod>,
    /// Tuple accessor methods by position, ascending
    tuple_accessors: BTreeMap<usize, String>,
    outcome: Option<OutcomeSupport>,
}

impl BehaviorClass {
    /// Create a new class with a fresh type ID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            type_id: BehaviorTypeId::new(),
            name: name.into(),
            methods: IndexMap::new(),
            tuple_accessors: BTreeMap::new(),
            outcome: None,
        }
    }

    /// The class's registered type ID
    pub fn type_id(&self) -> BehaviorTypeId {
        self.type_id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a method on this class (builder form)
    pub fn with_method(mut self, method: BehaviorMethod) -> Self {
        self.add_method(method);
        self
    }

    /// Register a method on this class
    pub fn add_method(&mut self, method: BehaviorMethod) {
        self.methods.insert(method.name.clone(), method);
    }

    /// Look up a method by name
    pub fn method(&self, name: &str) -> Option<&BehaviorMethod> {
        self.methods.get(name)
    }

    /// Mark a registered method as the tuple accessor for `index`
    pub fn set_tuple_accessor(&mut self, index: usize, method_name: impl Into<String>) {
        self.tuple_accessors.insert(index, method_name.into());
    }

    /// Declared tuple arity: the number of registered accessors
    pub fn tuple_arity(&self) -> usize {
        self.tuple_accessors.len()
    }

    /// Mark this class as a two-state outcome value (builder form)
    pub fn with_outcome_support(mut self, support: OutcomeSupport) -> Self {
        self.outcome = Some(support);
        self
    }

    /// Outcome probe methods, if this class is a two-state value
    pub fn outcome_support(&self) -> Option<&OutcomeSupport> {
        self.outcome.as_ref()
    }

    fn method_index(&self, name: &str) -> Option<usize> {
        self.methods.get_index_of(name)
    }

    fn method_at(&self, index: usize) -> Option<&BehaviorMethod> {
        self.methods.get_index(index).map(|(_, method)| method)
    }
}

/// The reflection registry consumed by the invocation bridge
#[derive(Debug, Default)]
pub struct BehaviorRegistry {
    classes: IndexMap<BehaviorTypeId, BehaviorClass>,
    revision: u64,
}

impl BehaviorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, returning its type ID
    pub fn register(&mut self, class: BehaviorClass) -> BehaviorTypeId {
        let type_id = class.type_id;
        self.classes.insert(type_id, class);
        self.revision += 1;
        type_id
    }

    /// Look up a class by type ID
    pub fn class(&self, type_id: BehaviorTypeId) -> Option<&BehaviorClass> {
        self.classes.get(&type_id)
    }

    /// Mutably look up a class by type ID.
    ///
    /// Counts as a registry mutation: outstanding call-site caches are
    /// invalidated whether or not the caller changes anything.
    pub fn class_mut(&mut self, type_id: BehaviorTypeId) -> Option<&mut BehaviorClass> {
        self.revision += 1;
        self.classes.get_mut(&type_id)
    }

    /// Resolve a method by (type identifier, method name)
    pub fn resolve_method(&self, type_id: BehaviorTypeId, name: &str) -> Option<&BehaviorMethod> {
        self.class(type_id)?.method(name)
    }

    /// Resolve the tuple accessors of a result type, ascending by index.
    ///
    /// Empty when the type is unregistered or declares no accessors.
    pub fn resolve_tuple_accessors(
        &self,
        type_id: BehaviorTypeId,
    ) -> Vec<(usize, &BehaviorMethod)> {
        let Some(class) = self.class(type_id) else {
            return Vec::new();
        };
        class
            .tuple_accessors
            .iter()
            .filter_map(|(&index, name)| class.method(name).map(|method| (index, method)))
            .collect()
    }

    /// Current revision; bumped on every mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn class_index(&self, type_id: BehaviorTypeId) -> Option<usize> {
        self.classes.get_index_of(&type_id)
    }

    fn method_at(&self, class_index: usize, method_index: usize) -> Option<&BehaviorMethod> {
        let (_, class) = self.classes.get_index(class_index)?;
        class.method_at(method_index)
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedResolution {
    revision: u64,
    class_index: usize,
    method_index: usize,
}

/// A lazily-populated per-call-site method resolution cache.
///
/// The cache records the registry revision it resolved against; any
/// registry mutation invalidates it, so resolution is never stale and never
/// performed eagerly at registration time.
#[derive(Debug)]
pub struct MethodCallSite {
    type_id: BehaviorTypeId,
    method: String,
    cached: Cell<Option<CachedResolution>>,
}

impl MethodCallSite {
    /// Create a call site for (type identifier, method name)
    pub fn new(type_id: BehaviorTypeId, method: impl Into<String>) -> Self {
        Self {
            type_id,
            method: method.into(),
            cached: Cell::new(None),
        }
    }

    /// The target type identifier
    pub fn type_id(&self) -> BehaviorTypeId {
        self.type_id
    }

    /// The target method name
    pub fn method_name(&self) -> &str {
        &self.method
    }

    /// Resolve the method, consulting the cache when still valid
    pub fn resolve<'r>(&self, registry: &'r BehaviorRegistry) -> Option<&'r BehaviorMethod> {
        if let Some(cached) = self.cached.get() {
            if cached.revision == registry.revision() {
                return registry.method_at(cached.class_index, cached.method_index);
            }
        }

        let class_index = registry.class_index(self.type_id)?;
        let (_, class) = registry.classes.get_index(class_index)?;
        let method_index = class.method_index(&self.method)?;
        self.cached.set(Some(CachedResolution {
            revision: registry.revision(),
            class_index,
            method_index,
        }));
        class.method_at(method_index)
    }
}
