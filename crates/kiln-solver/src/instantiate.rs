//! Instantiation of declaration-level types.
//!
//! A declaration's bases are written in terms of its own type parameters
//! (`class List[T] : Iterable[T]`). Walking the hierarchy of `List[int32]`
//! instantiates those bases with `T := int32`.

use crate::db::TypeDatabase;
use crate::def::Definition;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{TypeData, TypeFlags, TypeId};
use crate::visitor::map_children;
use rustc_hash::FxHashMap;
use tracing::warn;

/// Maximum nesting depth of a single instantiation.
pub const MAX_INSTANTIATION_DEPTH: u32 = kiln_common::limits::MAX_SUBST_DEPTH;

/// A mapping from pattern variables to types.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeId, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map each type parameter of `definition` to the argument at the same position.
    ///
    /// Missing arguments leave the parameter unmapped; extra arguments are ignored.
    pub fn from_args(definition: &Definition, args: &[TypeId]) -> Self {
        let map = definition
            .type_params
            .iter()
            .zip(args)
            .map(|(param, &arg)| (param.var, arg))
            .collect();
        Self { map }
    }

    pub fn insert(&mut self, var: TypeId, ty: TypeId) {
        self.map.insert(var, ty);
    }

    pub fn get(&self, var: TypeId) -> Option<TypeId> {
        self.map.get(&var).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Replace every mapped pattern variable inside `ty`.
///
/// Returns `ty` unchanged when it contains no pattern variables or the
/// substitution is empty.
pub fn instantiate_type(db: &dyn TypeDatabase, ty: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() {
        return ty;
    }
    let mut depth = DepthCounter::with_profile(RecursionProfile::Substitution);
    instantiate_inner(db, ty, subst, &mut depth)
}

fn instantiate_inner(
    db: &dyn TypeDatabase,
    ty: TypeId,
    subst: &TypeSubstitution,
    depth: &mut DepthCounter,
) -> TypeId {
    if !db.flags(ty).contains(TypeFlags::CONTAINS_PATTERN_VAR) {
        return ty;
    }
    if let Some(TypeData::PatternVar(_)) = db.lookup(ty) {
        return subst.get(ty).unwrap_or(ty);
    }
    if !depth.enter() {
        warn!(type_id = ty.0, "instantiate_type: depth limit exceeded");
        return TypeId::ERROR;
    }
    let result = map_children(db, ty, &mut |child| instantiate_inner(db, child, subst, depth));
    depth.leave();
    result
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod instantiate_tests;
