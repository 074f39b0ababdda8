//! Declaration hierarchy queries.
//!
//! Bases are stored in terms of the declaring type's own parameters, so every
//! step up the hierarchy instantiates the base with the current arguments.
//! Cyclic declarations (`class A : B`, `class B : A`) are tolerated: walks
//! track visited declarations and stop.

use crate::db::TypeDatabase;
use crate::def::DefId;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{TypeData, TypeId};
use kiln_common::limits;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::warn;

/// Direct bases of a composite type, instantiated with its arguments.
pub fn direct_bases(db: &dyn TypeDatabase, ty: TypeId) -> Vec<TypeId> {
    let Some(TypeData::Composite { def, args }) = db.lookup(ty) else {
        return Vec::new();
    };
    let Some(definition) = db.definition(def) else {
        return Vec::new();
    };
    let args = db.type_list(args);
    let subst = TypeSubstitution::from_args(&definition, &args);
    definition
        .bases
        .iter()
        .map(|&base| instantiate_type(db, base, &subst))
        .collect()
}

/// `ty` followed by all of its ancestors, nearest first (breadth-first).
///
/// Each declaration appears at most once.
pub fn ancestors(db: &dyn TypeDatabase, ty: TypeId) -> Vec<TypeId> {
    let mut result = Vec::new();
    let mut seen_defs: FxHashSet<DefId> = FxHashSet::default();
    let mut queue = VecDeque::from([ty]);
    let mut iterations = 0u32;

    while let Some(current) = queue.pop_front() {
        iterations += 1;
        if iterations > limits::MAX_WALK_ITERATIONS {
            warn!(type_id = ty.0, "ancestors: iteration limit exceeded");
            break;
        }
        let Some(TypeData::Composite { def, .. }) = db.lookup(current) else {
            continue;
        };
        if !seen_defs.insert(def) {
            continue;
        }
        result.push(current);
        queue.extend(direct_bases(db, current));
    }
    result
}

/// The instantiation of `target` among the ancestors of `ty` (or `ty` itself).
///
/// `upcast(List[int32], Iterable)` is `Iterable[int32]` when
/// `class List[T] : Iterable[T]`.
pub fn upcast(db: &dyn TypeDatabase, ty: TypeId, target: DefId) -> Option<TypeId> {
    ancestors(db, ty).into_iter().find(|&ancestor| {
        matches!(
            db.lookup(ancestor),
            Some(TypeData::Composite { def, .. }) if def == target
        )
    })
}

/// Whether declaration `def` is `target` or inherits from it.
pub fn is_derived_from(db: &dyn TypeDatabase, def: DefId, target: DefId) -> bool {
    let mut guard = RecursionGuard::with_profile(RecursionProfile::Hierarchy);
    is_derived_from_inner(db, def, target, &mut guard)
}

fn is_derived_from_inner(
    db: &dyn TypeDatabase,
    def: DefId,
    target: DefId,
    guard: &mut RecursionGuard<DefId>,
) -> bool {
    if def == target {
        return true;
    }
    match guard.enter(def) {
        RecursionResult::Entered => {}
        RecursionResult::Cycle => return false,
        RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
            warn!(def_id = def.0, "is_derived_from: hierarchy limit exceeded");
            return false;
        }
    }
    let found = db.definition(def).is_some_and(|definition| {
        definition.bases.iter().any(|&base| match db.lookup(base) {
            Some(TypeData::Composite { def: base_def, .. }) => {
                is_derived_from_inner(db, base_def, target, guard)
            }
            _ => false,
        })
    });
    guard.leave(def);
    found
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod hierarchy_tests;
