//! Structural relations between types: equality, subtyping, inclusion,
//! join and meet.
//!
//! Relations are tri-state. A pattern value whose variable is not bound yet,
//! a deferred call-type node, or the `unknown` intrinsic cannot be related
//! either way, and the answer is [`SubtypeResult::Unknown`] instead of a guess.
//!
//! Rules, for `source <: target`:
//! - `never` is below everything, `any` above everything, `error` relates to everything
//! - a union source needs every member to relate; a union target needs one
//! - composites of the same declaration compare arguments by declared variance;
//!   different declarations upcast the source first
//! - functions: parameters contravariant, result covariant
//! - tuples are covariant; pointers, addresses, arrays and type literals are invariant
//! - a raw pattern variable is rigid: it only relates to itself

use crate::binding::BindingLookup;
use crate::db::TypeDatabase;
use crate::def::DefId;
use crate::hierarchy::{ancestors, upcast};
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{IntrinsicKind, TypeData, TypeFlags, TypeId, TypeListId};
use crate::variance::Variance;
use tracing::{trace, warn};

/// Outcome of a relation query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubtypeResult {
    True,
    False,
    /// Depends on something not resolved yet.
    Unknown,
}

impl SubtypeResult {
    pub fn from_bool(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }

    #[inline]
    pub fn is_true(self) -> bool {
        self == Self::True
    }

    #[inline]
    pub fn is_false(self) -> bool {
        self == Self::False
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }

    /// Conjunction: `False` dominates, then `Unknown`.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            _ => Self::True,
        }
    }

    /// Disjunction: `True` dominates, then `Unknown`.
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            _ => Self::False,
        }
    }
}

/// Flags that make id inequality inconclusive for equality.
const UNRESOLVED: TypeFlags = TypeFlags::CONTAINS_PATTERN_VALUE
    .union(TypeFlags::CONTAINS_DEFERRED)
    .union(TypeFlags::CONTAINS_UNKNOWN)
    .union(TypeFlags::CONTAINS_ERROR);

/// Relation engine over one type database and one view of the bindings.
pub struct RelationChecker<'a> {
    db: &'a dyn TypeDatabase,
    bindings: &'a dyn BindingLookup,
    depth: DepthCounter,
}

impl<'a> RelationChecker<'a> {
    pub fn new(db: &'a dyn TypeDatabase, bindings: &'a dyn BindingLookup) -> Self {
        Self {
            db,
            bindings,
            depth: DepthCounter::with_profile(RecursionProfile::Relation),
        }
    }

    /// Current value of a pattern value node; other types are returned as is.
    fn resolve(&self, ty: TypeId) -> Option<TypeId> {
        match self.db.lookup(ty) {
            Some(TypeData::PatternValue { env, var }) => {
                self.bindings.resolve_pattern_value(self.db, env, var)
            }
            _ => Some(ty),
        }
    }

    fn is_undetermined(&self, ty: TypeId) -> bool {
        ty == TypeId::UNKNOWN
            || matches!(
                self.db.lookup(ty),
                Some(TypeData::ResultOf(_) | TypeData::ParameterOf { .. })
            )
    }

    /// `source <: target`.
    pub fn check_subtype(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        if source == target {
            return SubtypeResult::True;
        }
        if !self.depth.enter() {
            warn!(
                source = source.0,
                target = target.0,
                "check_subtype: depth limit exceeded"
            );
            return SubtypeResult::Unknown;
        }
        let result = self.check_subtype_inner(source, target);
        self.depth.leave();
        trace!(source = source.0, target = target.0, ?result, "check_subtype");
        result
    }

    fn check_subtype_inner(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        let (Some(source), Some(target)) = (self.resolve(source), self.resolve(target)) else {
            return SubtypeResult::Unknown;
        };
        if source == target || source == TypeId::ERROR || target == TypeId::ERROR {
            return SubtypeResult::True;
        }
        if source == TypeId::NEVER || target == TypeId::ANY {
            return SubtypeResult::True;
        }
        if self.is_undetermined(source) || self.is_undetermined(target) {
            return SubtypeResult::Unknown;
        }
        let (Some(s), Some(t)) = (self.db.lookup(source), self.db.lookup(target)) else {
            return SubtypeResult::False;
        };

        match (s, t) {
            (TypeData::Union(members), _) => {
                let members = self.db.type_list(members);
                let mut result = SubtypeResult::True;
                for &member in members.iter() {
                    result = result.and(self.check_subtype(member, target));
                    if result.is_false() {
                        break;
                    }
                }
                result
            }
            (_, TypeData::Union(members)) => {
                let members = self.db.type_list(members);
                let mut result = SubtypeResult::False;
                for &member in members.iter() {
                    result = result.or(self.check_subtype(source, member));
                    if result.is_true() {
                        break;
                    }
                }
                result
            }
            (
                TypeData::Composite {
                    def: s_def,
                    args: s_args,
                },
                TypeData::Composite {
                    def: t_def,
                    args: t_args,
                },
            ) => {
                if s_def == t_def {
                    return self.check_args(t_def, s_args, t_args);
                }
                match upcast(self.db, source, t_def).and_then(|up| self.db.lookup(up)) {
                    Some(TypeData::Composite { args: up_args, .. }) => {
                        self.check_args(t_def, up_args, t_args)
                    }
                    _ => SubtypeResult::False,
                }
            }
            (
                TypeData::Function {
                    params: s_params,
                    result: s_result,
                },
                TypeData::Function {
                    params: t_params,
                    result: t_result,
                },
            ) => {
                let s_params = self.db.type_list(s_params);
                let t_params = self.db.type_list(t_params);
                if s_params.len() != t_params.len() {
                    return SubtypeResult::False;
                }
                let mut result = self.check_subtype(s_result, t_result);
                for (&sp, &tp) in s_params.iter().zip(t_params.iter()) {
                    if result.is_false() {
                        break;
                    }
                    result = result.and(self.check_subtype(tp, sp));
                }
                result
            }
            (TypeData::Tuple(s_elems), TypeData::Tuple(t_elems)) => {
                let s_elems = self.db.type_list(s_elems);
                let t_elems = self.db.type_list(t_elems);
                if s_elems.len() != t_elems.len() {
                    return SubtypeResult::False;
                }
                let mut result = SubtypeResult::True;
                for (&se, &te) in s_elems.iter().zip(t_elems.iter()) {
                    if result.is_false() {
                        break;
                    }
                    result = result.and(self.check_subtype(se, te));
                }
                result
            }
            (TypeData::Pointer(s_inner), TypeData::Pointer(t_inner))
            | (TypeData::Address(s_inner), TypeData::Address(t_inner))
            | (TypeData::TypeLiteral(s_inner), TypeData::TypeLiteral(t_inner)) => {
                self.check_equal(s_inner, t_inner)
            }
            (
                TypeData::NativeArray {
                    element: s_elem,
                    length: s_len,
                },
                TypeData::NativeArray {
                    element: t_elem,
                    length: t_len,
                },
            ) => self
                .check_equal(s_len, t_len)
                .and(self.check_equal(s_elem, t_elem)),
            (TypeData::Intrinsic(IntrinsicKind::Null), TypeData::Pointer(_) | TypeData::Address(_)) => {
                SubtypeResult::True
            }
            (TypeData::Intrinsic(IntrinsicKind::Null), TypeData::Composite { def, .. }) => {
                SubtypeResult::from_bool(
                    self.db
                        .definitions()
                        .get_kind(def)
                        .is_some_and(|kind| kind.is_reference()),
                )
            }
            _ => SubtypeResult::False,
        }
    }

    /// Compare the arguments of two instantiations of `def` by declared variance.
    fn check_args(&mut self, def: DefId, s_args: TypeListId, t_args: TypeListId) -> SubtypeResult {
        let s_args = self.db.type_list(s_args);
        let t_args = self.db.type_list(t_args);
        if s_args.len() != t_args.len() {
            return SubtypeResult::False;
        }
        let definition = self.db.definition(def);
        let mut result = SubtypeResult::True;
        for (index, (&sa, &ta)) in s_args.iter().zip(t_args.iter()).enumerate() {
            if result.is_false() {
                break;
            }
            let variance = definition
                .as_ref()
                .map(|definition| definition.param_variance(index))
                .unwrap_or_default();
            let arg_result = match variance {
                Variance::Covariant => self.check_subtype(sa, ta),
                Variance::Contravariant => self.check_subtype(ta, sa),
                Variance::Invariant => self.check_equal(sa, ta),
            };
            result = result.and(arg_result);
        }
        result
    }

    /// Structural equality.
    ///
    /// Interning makes id equality exact for settled types; only types that
    /// still contain unresolved parts need a structural comparison.
    pub fn check_equal(&mut self, a: TypeId, b: TypeId) -> SubtypeResult {
        if a == b {
            return SubtypeResult::True;
        }
        let (Some(a), Some(b)) = (self.resolve(a), self.resolve(b)) else {
            return SubtypeResult::Unknown;
        };
        if a == b || a == TypeId::ERROR || b == TypeId::ERROR {
            return SubtypeResult::True;
        }
        if !(self.db.flags(a) | self.db.flags(b)).intersects(UNRESOLVED) {
            return SubtypeResult::False;
        }
        let forward = self.check_subtype(a, b);
        if forward.is_false() {
            return forward;
        }
        forward.and(self.check_subtype(b, a))
    }
}

// =============================================================================
// Query entry points
// =============================================================================

pub fn is_subtype(
    db: &dyn TypeDatabase,
    bindings: &dyn BindingLookup,
    source: TypeId,
    target: TypeId,
) -> SubtypeResult {
    RelationChecker::new(db, bindings).check_subtype(source, target)
}

pub fn is_equal(
    db: &dyn TypeDatabase,
    bindings: &dyn BindingLookup,
    a: TypeId,
    b: TypeId,
) -> SubtypeResult {
    RelationChecker::new(db, bindings).check_equal(a, b)
}

/// Whether every value of `member` is a value of `container`.
pub fn includes(
    db: &dyn TypeDatabase,
    bindings: &dyn BindingLookup,
    container: TypeId,
    member: TypeId,
) -> SubtypeResult {
    is_subtype(db, bindings, member, container)
}

/// Least common supertype of `a` and `b`.
///
/// Two composites join at the nearest ancestor of `a` that `b` is a subtype
/// of; anything else without a subtype relation joins as the union `a | b`.
pub fn join(db: &dyn TypeDatabase, bindings: &dyn BindingLookup, a: TypeId, b: TypeId) -> TypeId {
    if a == b || b == TypeId::NEVER {
        return a;
    }
    if a == TypeId::NEVER {
        return b;
    }
    let mut checker = RelationChecker::new(db, bindings);
    if checker.check_subtype(a, b).is_true() {
        return b;
    }
    if checker.check_subtype(b, a).is_true() {
        return a;
    }
    if matches!(db.lookup(a), Some(TypeData::Composite { .. }))
        && matches!(db.lookup(b), Some(TypeData::Composite { .. }))
    {
        for ancestor in ancestors(db, a).into_iter().skip(1) {
            if checker.check_subtype(b, ancestor).is_true() {
                return ancestor;
            }
        }
    }
    db.union2(a, b)
}

/// Greatest common subtype of `a` and `b`, if one exists.
pub fn meet(
    db: &dyn TypeDatabase,
    bindings: &dyn BindingLookup,
    a: TypeId,
    b: TypeId,
) -> Option<TypeId> {
    if a == b || b == TypeId::ANY {
        return Some(a);
    }
    if a == TypeId::ANY {
        return Some(b);
    }
    let mut checker = RelationChecker::new(db, bindings);
    if checker.check_subtype(a, b).is_true() {
        return Some(a);
    }
    if checker.check_subtype(b, a).is_true() {
        return Some(b);
    }
    for (union, other) in [(a, b), (b, a)] {
        if let Some(TypeData::Union(members)) = db.lookup(union) {
            let kept: Vec<TypeId> = db
                .type_list(members)
                .iter()
                .copied()
                .filter(|&member| checker.check_subtype(member, other).is_true())
                .collect();
            if !kept.is_empty() {
                return Some(db.union(kept));
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "../tests/relation_tests.rs"]
mod relation_tests;
