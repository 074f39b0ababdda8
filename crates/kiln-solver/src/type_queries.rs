//! Type Content Queries
//!
//! Small predicates over interned types. Most of them read the `TypeFlags`
//! computed at intern time and never walk the type.

use crate::db::TypeDatabase;
use crate::types::{ConstValue, IntrinsicKind, TypeData, TypeFlags, TypeId};

// =============================================================================
// Flag-based queries
// =============================================================================

/// A singular type is fully settled: no pattern variables, no pattern values,
/// no deferred call types and no `error`/`unknown` anywhere inside it.
pub fn is_singular(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    !db.flags(ty).intersects(TypeFlags::UNSETTLED)
}

/// Check if a type contains any pattern variables.
pub fn contains_pattern_vars(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    db.flags(ty).contains(TypeFlags::CONTAINS_PATTERN_VAR)
}

/// Check if a type contains pattern variables or pattern values, i.e. whether
/// `BindingEnv::subst` can change it.
pub fn contains_variables(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    db.flags(ty).intersects(TypeFlags::HAS_VARIABLES)
}

/// Check if a type contains `ResultOf` / `ParameterOf` nodes.
pub fn contains_deferred(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    db.flags(ty).contains(TypeFlags::CONTAINS_DEFERRED)
}

pub fn contains_error(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    db.flags(ty).contains(TypeFlags::CONTAINS_ERROR)
}

// =============================================================================
// Shape queries
// =============================================================================

/// The intrinsic kind of `ty`, if it is an intrinsic.
pub fn intrinsic_kind(db: &dyn TypeDatabase, ty: TypeId) -> Option<IntrinsicKind> {
    match db.lookup(ty) {
        Some(TypeData::Intrinsic(kind)) => Some(kind),
        _ => None,
    }
}

/// Whether values of `ty` are object references.
///
/// Class, interface and protocol instances are references; so is `null` and
/// a union made only of references. Structs, primitives, tuples and native
/// pointers are not.
pub fn is_reference_type(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    match db.lookup(ty) {
        Some(TypeData::Intrinsic(IntrinsicKind::Null)) => true,
        Some(TypeData::Composite { def, .. }) => db
            .definitions()
            .get_kind(def)
            .is_some_and(|kind| kind.is_reference()),
        Some(TypeData::Union(members)) => {
            let members = db.type_list(members);
            !members.is_empty() && members.iter().all(|&member| is_reference_type(db, member))
        }
        _ => false,
    }
}

/// The integer value of a type-level constant.
pub fn constant_int(db: &dyn TypeDatabase, ty: TypeId) -> Option<i64> {
    match db.lookup(ty) {
        Some(TypeData::Constant(ConstValue::Int(value))) => Some(value),
        _ => None,
    }
}

/// Parameter and result types of a function type.
pub fn function_signature(db: &dyn TypeDatabase, ty: TypeId) -> Option<(Vec<TypeId>, TypeId)> {
    match db.lookup(ty) {
        Some(TypeData::Function { params, result }) => {
            Some((db.type_list(params).to_vec(), result))
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/type_queries_tests.rs"]
mod type_queries_tests;
