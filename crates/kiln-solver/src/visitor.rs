//! Structural traversal helpers over the type graph.
//!
//! Every rewriting pass in the solver (environment substitution, declaration
//! instantiation, deferred-constraint resolution) has the same shape: decide
//! what to do with leaves, recurse into children, and rebuild a node only if
//! one of its children changed. [`map_children`] is the shared "recurse and
//! rebuild" half, matched exhaustively so a new `TypeData` variant cannot be
//! silently skipped.

use crate::db::TypeDatabase;
use crate::intern::TypeListBuffer;
use crate::types::{TypeData, TypeId};
use rustc_hash::FxHashSet;

/// Direct children of a type, in structural order.
///
/// A pattern value's `var` is not a child: the node is a reference into an
/// environment, not a structure containing the variable.
pub fn child_types(db: &dyn TypeDatabase, ty: TypeId) -> TypeListBuffer {
    let mut children = TypeListBuffer::new();
    let Some(data) = db.lookup(ty) else {
        return children;
    };
    match data {
        TypeData::Intrinsic(_)
        | TypeData::Constant(_)
        | TypeData::Enum(_)
        | TypeData::PatternVar(_)
        | TypeData::PatternValue { .. }
        | TypeData::ResultOf(_)
        | TypeData::ParameterOf { .. } => {}
        TypeData::Address(inner) | TypeData::Pointer(inner) | TypeData::TypeLiteral(inner) => {
            children.push(inner);
        }
        TypeData::NativeArray { element, length } => {
            children.push(element);
            children.push(length);
        }
        TypeData::Tuple(list) | TypeData::Union(list) | TypeData::Composite { args: list, .. } => {
            children.extend(db.type_list(list).iter().copied());
        }
        TypeData::Function { params, result } => {
            children.extend(db.type_list(params).iter().copied());
            children.push(result);
        }
    }
    children
}

/// Apply `f` to every direct child of `ty` and rebuild the node.
///
/// Returns `ty` itself (nothing interned) when `f` leaves every child
/// unchanged. Unions are rebuilt through `union()` so the result stays
/// normalized.
pub fn map_children(
    db: &dyn TypeDatabase,
    ty: TypeId,
    f: &mut dyn FnMut(TypeId) -> TypeId,
) -> TypeId {
    let Some(data) = db.lookup(ty) else {
        return ty;
    };
    match data {
        TypeData::Intrinsic(_)
        | TypeData::Constant(_)
        | TypeData::Enum(_)
        | TypeData::PatternVar(_)
        | TypeData::PatternValue { .. }
        | TypeData::ResultOf(_)
        | TypeData::ParameterOf { .. } => ty,
        TypeData::Address(inner) => {
            let new_inner = f(inner);
            if new_inner == inner { ty } else { db.address(new_inner) }
        }
        TypeData::Pointer(inner) => {
            let new_inner = f(inner);
            if new_inner == inner { ty } else { db.pointer(new_inner) }
        }
        TypeData::TypeLiteral(inner) => {
            let new_inner = f(inner);
            if new_inner == inner { ty } else { db.type_literal(new_inner) }
        }
        TypeData::NativeArray { element, length } => {
            let new_element = f(element);
            let new_length = f(length);
            if new_element == element && new_length == length {
                ty
            } else {
                db.native_array(new_element, new_length)
            }
        }
        TypeData::Tuple(list) => match map_list(&db.type_list(list), f) {
            Some(elements) => db.tuple(elements),
            None => ty,
        },
        TypeData::Union(list) => match map_list(&db.type_list(list), f) {
            Some(members) => db.union(members),
            None => ty,
        },
        TypeData::Composite { def, args } => match map_list(&db.type_list(args), f) {
            Some(args) => db.composite(def, args),
            None => ty,
        },
        TypeData::Function { params, result } => {
            let new_params = map_list(&db.type_list(params), f);
            let new_result = f(result);
            if new_params.is_none() && new_result == result {
                return ty;
            }
            let params = new_params.unwrap_or_else(|| db.type_list(params).to_vec());
            db.function(params, new_result)
        }
    }
}

/// Map a list; `None` when no element changed.
fn map_list(items: &[TypeId], f: &mut dyn FnMut(TypeId) -> TypeId) -> Option<Vec<TypeId>> {
    let mut changed = false;
    let mapped: Vec<TypeId> = items
        .iter()
        .map(|&item| {
            let new_item = f(item);
            changed |= new_item != item;
            new_item
        })
        .collect();
    changed.then_some(mapped)
}

/// Whether `needle` occurs anywhere inside `haystack` (including itself).
pub fn contains_type(db: &dyn TypeDatabase, haystack: TypeId, needle: TypeId) -> bool {
    let mut visited = FxHashSet::default();
    let mut stack = vec![haystack];
    while let Some(ty) = stack.pop() {
        if ty == needle {
            return true;
        }
        if !visited.insert(ty) {
            continue;
        }
        stack.extend(child_types(db, ty));
    }
    false
}

#[cfg(test)]
#[path = "../tests/visitor_tests.rs"]
mod visitor_tests;
