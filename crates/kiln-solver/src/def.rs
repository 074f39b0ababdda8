//! Declaration identifiers and storage for the solver.
//!
//! Composite declarations (classes, structs, interfaces, protocols) and enums
//! are registered here. A composite carries its generic parameters, each a
//! pattern variable with a declared variance, and its base types written in
//! terms of those parameters. Unification and subtyping read bases to walk the
//! inheritance hierarchy.

use crate::types::TypeId;
use crate::variance::Variance;
use dashmap::DashMap;
use kiln_common::interner::Atom;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::trace;

/// Global counter for assigning unique instance IDs to `DefinitionStore` instances.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// DefId
// =============================================================================

/// Solver-owned declaration identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    /// Check if this `DefId` is valid.
    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

// =============================================================================
// DefKind
// =============================================================================

/// Kind of declaration.
///
/// | Kind | Storage | Example |
/// |------|---------|---------|
/// | Class | Reference | `class List[T]` |
/// | Struct | Value | `struct Pair[A, B]` |
/// | Interface | Reference | `interface Iterable[T]` |
/// | Protocol | Reference | `protocol HasLength` |
/// | Enum | Value | `enum Color { Red, Green }` |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    Class,
    Struct,
    Interface,
    Protocol,
    Enum,
}

impl DefKind {
    /// Whether values of this kind are handled by reference.
    pub fn is_reference(self) -> bool {
        matches!(self, DefKind::Class | DefKind::Interface | DefKind::Protocol)
    }
}

// =============================================================================
// Definition data
// =============================================================================

/// A generic parameter of a declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    /// The `PatternVar` type standing for the parameter inside the declaration.
    pub var: TypeId,
    /// Declared variance of the parameter.
    pub variance: Variance,
}

/// Complete information about a declaration.
#[derive(Clone, Debug)]
pub struct Definition {
    pub kind: DefKind,
    /// Name of the declaration (for diagnostics)
    pub name: Atom,
    /// Generic parameters, in positional order
    pub type_params: Vec<TypeParamInfo>,
    /// Direct supertypes, expressed in terms of `type_params`
    pub bases: Vec<TypeId>,
    /// For enums: member names
    pub enum_members: Vec<Atom>,
}

impl Definition {
    pub fn composite(kind: DefKind, name: Atom) -> Self {
        Self {
            kind,
            name,
            type_params: Vec::new(),
            bases: Vec::new(),
            enum_members: Vec::new(),
        }
    }

    pub fn enumeration(name: Atom, members: Vec<Atom>) -> Self {
        Self {
            kind: DefKind::Enum,
            name,
            type_params: Vec::new(),
            bases: Vec::new(),
            enum_members: members,
        }
    }

    /// Declared variance of the parameter at `index` (invariant if out of range).
    pub fn param_variance(&self, index: usize) -> Variance {
        self.type_params
            .get(index)
            .map(|param| param.variance)
            .unwrap_or(Variance::Invariant)
    }
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Thread-safe storage for declarations.
pub struct DefinitionStore {
    /// Unique instance ID for debugging
    instance_id: u64,

    /// `DefId` -> `Definition` mapping
    definitions: DashMap<DefId, Arc<Definition>>,

    /// Next available `DefId`
    next_id: AtomicU32,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "DefinitionStore::new");
        Self {
            instance_id,
            definitions: DashMap::new(),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
        }
    }

    /// Register a new declaration and return its `DefId`.
    pub fn register(&self, definition: Definition) -> DefId {
        let id = DefId(self.next_id.fetch_add(1, Ordering::SeqCst));
        trace!(
            instance_id = self.instance_id,
            def_id = id.0,
            kind = ?definition.kind,
            "DefinitionStore::register"
        );
        self.definitions.insert(id, Arc::new(definition));
        id
    }

    /// Get a declaration by `DefId`.
    pub fn get(&self, id: DefId) -> Option<Arc<Definition>> {
        self.definitions.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: DefId) -> bool {
        self.definitions.contains_key(&id)
    }

    pub fn get_kind(&self, id: DefId) -> Option<DefKind> {
        self.definitions.get(&id).map(|entry| entry.kind)
    }

    /// Append a generic parameter to a declaration.
    pub fn push_type_param(&self, id: DefId, param: TypeParamInfo) {
        if let Some(mut entry) = self.definitions.get_mut(&id) {
            Arc::make_mut(entry.value_mut()).type_params.push(param);
        }
    }

    /// Append a direct supertype to a declaration.
    pub fn push_base(&self, id: DefId, base: TypeId) {
        if let Some(mut entry) = self.definitions.get_mut(&id) {
            Arc::make_mut(entry.value_mut()).bases.push(base);
        }
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod def_tests;
