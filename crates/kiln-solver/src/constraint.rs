//! Deferred call-type constraints.
//!
//! While an overloaded call still has several viable candidates, the type of
//! its result (or of one of its parameters) is represented by a `ResultOf` /
//! `ParameterOf` node instead of a concrete type. Those nodes flow into other
//! types like any other type. Once candidates have been culled,
//! [`resolve_deferred_types`] rewrites every node that now has a singular
//! answer, and [`finalize_deferred`] turns whatever is still deferred into
//! [`OverloadError`]s.

use crate::call::CallTable;
use crate::db::TypeDatabase;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{CallId, TypeData, TypeFlags, TypeId};
use crate::visitor::{child_types, map_children};
use kiln_common::limits::MAX_DEFERRED_RESOLUTION_PASSES;
use rustc_hash::FxHashSet;
use std::fmt;
use tracing::{debug, trace, warn};

/// A type that depends on how an overloaded call resolves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeferredConstraint {
    /// The result type of `call`.
    ResultOf(CallId),
    /// The type of parameter `index` of `call`.
    ParameterOf { call: CallId, index: u32 },
}

/// Outcome of resolving one deferred constraint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintResolution {
    /// Every live candidate agrees on this type.
    Resolved(TypeId),
    /// Several live candidates disagree.
    Ambiguous { live: usize },
    /// No live candidate remains (or the call is unknown), or none of the live
    /// candidates has the requested parameter.
    NoCandidates,
}

impl DeferredConstraint {
    /// The constraint a `ResultOf` / `ParameterOf` node stands for.
    pub fn from_type(db: &dyn TypeDatabase, ty: TypeId) -> Option<Self> {
        match db.lookup(ty)? {
            TypeData::ResultOf(call) => Some(Self::ResultOf(call)),
            TypeData::ParameterOf { call, index } => Some(Self::ParameterOf { call, index }),
            _ => None,
        }
    }

    /// The interned node for this constraint.
    pub fn to_type(self, db: &dyn TypeDatabase) -> TypeId {
        match self {
            Self::ResultOf(call) => db.result_of(call),
            Self::ParameterOf { call, index } => db.parameter_of(call, index),
        }
    }

    pub fn call(self) -> CallId {
        match self {
            Self::ResultOf(call) | Self::ParameterOf { call, .. } => call,
        }
    }

    /// Ask the call again for a singular type at this position.
    pub fn resolve(self, db: &dyn TypeDatabase, calls: &CallTable) -> ConstraintResolution {
        let Some(site) = calls.get(self.call()) else {
            return ConstraintResolution::NoCandidates;
        };
        let live = site.live_count();
        if live == 0 {
            return ConstraintResolution::NoCandidates;
        }
        let ty = match self {
            Self::ResultOf(_) => site.singular_result_type(db),
            Self::ParameterOf { index, .. } => {
                // No live candidate takes that many arguments.
                if site
                    .live_candidates()
                    .all(|candidate| candidate.param_count(db) <= index as usize)
                {
                    return ConstraintResolution::NoCandidates;
                }
                site.singular_param_type(db, index as usize)
            }
        };
        match ty {
            Some(ty) => ConstraintResolution::Resolved(ty),
            None => ConstraintResolution::Ambiguous { live },
        }
    }
}

// =============================================================================
// Rewriting
// =============================================================================

/// Replace every resolvable deferred node inside `ty`.
///
/// A resolved type may itself contain deferred nodes of other calls, so the
/// rewrite repeats until nothing changes (bounded by
/// `MAX_DEFERRED_RESOLUTION_PASSES`). Returns `ty` itself when it contains no
/// deferred nodes or none of them resolve.
pub fn resolve_deferred_types(db: &dyn TypeDatabase, calls: &CallTable, ty: TypeId) -> TypeId {
    let mut current = ty;
    for pass in 0..MAX_DEFERRED_RESOLUTION_PASSES {
        if !db.flags(current).contains(TypeFlags::CONTAINS_DEFERRED) {
            return current;
        }
        let mut depth = DepthCounter::with_profile(RecursionProfile::Substitution);
        let next = rewrite(db, calls, current, &mut depth);
        trace!(pass, from = current.0, to = next.0, "resolve_deferred_types");
        if next == current {
            return current;
        }
        current = next;
    }
    warn!(type_id = ty.0, "resolve_deferred_types: pass limit exceeded");
    current
}

fn rewrite(db: &dyn TypeDatabase, calls: &CallTable, ty: TypeId, depth: &mut DepthCounter) -> TypeId {
    if !db.flags(ty).contains(TypeFlags::CONTAINS_DEFERRED) {
        return ty;
    }
    if !depth.enter() {
        warn!(type_id = ty.0, "resolve_deferred_types: depth limit exceeded");
        return ty;
    }
    let result = match DeferredConstraint::from_type(db, ty) {
        Some(constraint) => match constraint.resolve(db, calls) {
            ConstraintResolution::Resolved(resolved) => {
                debug!(?constraint, resolved = resolved.0, "deferred constraint resolved");
                resolved
            }
            _ => ty,
        },
        None => map_children(db, ty, &mut |child| rewrite(db, calls, child, depth)),
    };
    depth.leave();
    result
}

/// Deferred nodes inside `ty`, in first-seen order.
pub fn collect_deferred(db: &dyn TypeDatabase, ty: TypeId) -> Vec<DeferredConstraint> {
    let mut found = Vec::new();
    let mut seen: FxHashSet<TypeId> = FxHashSet::default();
    let mut stack = vec![ty];
    while let Some(current) = stack.pop() {
        if !db.flags(current).contains(TypeFlags::CONTAINS_DEFERRED) || !seen.insert(current) {
            continue;
        }
        match DeferredConstraint::from_type(db, current) {
            Some(constraint) => found.push(constraint),
            None => stack.extend(child_types(db, current).into_iter().rev()),
        }
    }
    found
}

// =============================================================================
// Finalization
// =============================================================================

/// A deferred constraint that could not be resolved before code generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverloadError {
    /// Every candidate of `call` was culled, or no live candidate takes the
    /// deferred parameter.
    NoMatchingOverload { call: CallId },
    /// Live candidates of `call` still disagree. `index` is the parameter
    /// position, or `None` for the result type.
    Ambiguous {
        call: CallId,
        index: Option<u32>,
        live: usize,
    },
}

impl OverloadError {
    pub fn call(&self) -> CallId {
        match self {
            OverloadError::NoMatchingOverload { call } | OverloadError::Ambiguous { call, .. } => {
                *call
            }
        }
    }
}

impl fmt::Display for OverloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverloadError::NoMatchingOverload { call } => {
                write!(f, "no matching overload for call #{}", call.0)
            }
            OverloadError::Ambiguous {
                call,
                index: Some(index),
                live,
            } => write!(
                f,
                "parameter {index} of call #{} is ambiguous between {live} candidates",
                call.0
            ),
            OverloadError::Ambiguous {
                call,
                index: None,
                live,
            } => write!(f, "call #{} is ambiguous between {live} candidates", call.0),
        }
    }
}

impl std::error::Error for OverloadError {}

/// Resolve every deferred node in `ty`; anything still deferred afterwards is
/// an error. Each call is reported once.
pub fn finalize_deferred(
    db: &dyn TypeDatabase,
    calls: &CallTable,
    ty: TypeId,
) -> Result<TypeId, Vec<OverloadError>> {
    let resolved = resolve_deferred_types(db, calls, ty);
    let remaining = collect_deferred(db, resolved);
    if remaining.is_empty() {
        return Ok(resolved);
    }

    let mut reported: FxHashSet<CallId> = FxHashSet::default();
    let mut errors = Vec::new();
    for constraint in remaining {
        if !reported.insert(constraint.call()) {
            continue;
        }
        let error = match constraint.resolve(db, calls) {
            ConstraintResolution::NoCandidates => OverloadError::NoMatchingOverload {
                call: constraint.call(),
            },
            ConstraintResolution::Ambiguous { live } => OverloadError::Ambiguous {
                call: constraint.call(),
                index: match constraint {
                    DeferredConstraint::ParameterOf { index, .. } => Some(index),
                    DeferredConstraint::ResultOf(_) => None,
                },
                live,
            },
            // The pass limit stopped the rewrite before this node.
            ConstraintResolution::Resolved(_) => OverloadError::Ambiguous {
                call: constraint.call(),
                index: None,
                live: 1,
            },
        };
        warn!(%error, "finalize_deferred");
        errors.push(error);
    }
    Err(errors)
}

#[cfg(test)]
#[path = "../tests/constraint_tests.rs"]
mod constraint_tests;
