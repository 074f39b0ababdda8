//! Unification of a generic pattern against a value.
//!
//! `BindingEnv::unify(db, pattern, value, variance)` walks both types in
//! lockstep and makes `pattern` consistent with `value`, creating or
//! narrowing bindings for the pattern variables it meets:
//!
//! | Variance | Meaning | Fresh binding |
//! |----------|---------|---------------|
//! | Invariant | `subst(pattern) == value` | `[V, V]` |
//! | Covariant | `value <: subst(pattern)` | `[V, any]` |
//! | Contravariant | `subst(pattern) <: value` | `[never, V]` |
//!
//! A later binding of the same variable narrows the interval: covariant
//! values raise the lower bound (join), contravariant values lower the upper
//! bound (meet), and the interval must stay non-empty.
//!
//! `unify` leaves partial bindings behind on failure; `unify_atomic` restores
//! the chain.

use crate::binding::{BindingEnv, BindingError};
use crate::db::TypeDatabase;
use crate::def::DefId;
use crate::hierarchy::upcast;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::relation::{RelationChecker, is_equal, join, meet};
use crate::types::{TypeData, TypeFlags, TypeId, TypeListId};
use crate::variance::Variance;
use crate::visitor::contains_type;
use std::fmt;
use tracing::{debug, trace, warn};

/// Why a unification failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnifyError {
    /// The two types have different shapes or are not equal.
    Mismatch { pattern: TypeId, value: TypeId },
    /// The value falls outside the bounds already recorded for `var`.
    BoundsViolation { var: TypeId, value: TypeId },
    /// Narrowing left `var` with a lower bound that is not below its upper bound.
    EmptyInterval {
        var: TypeId,
        upper: TypeId,
        lower: TypeId,
    },
    /// Binding `var` to `value` would make it contain itself.
    OccursCheck { var: TypeId, value: TypeId },
    /// Variable-to-variable bindings form a cycle.
    BindingCycle { var: TypeId },
    /// The walk exceeded the unification depth limit.
    DepthExceeded,
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnifyError::Mismatch { pattern, value } => {
                write!(f, "type {} does not match pattern {}", value.0, pattern.0)
            }
            UnifyError::BoundsViolation { var, value } => {
                write!(f, "type {} violates the bounds of variable {}", value.0, var.0)
            }
            UnifyError::EmptyInterval { var, upper, lower } => write!(
                f,
                "variable {} has lower bound {} outside upper bound {}",
                var.0, lower.0, upper.0
            ),
            UnifyError::OccursCheck { var, value } => {
                write!(f, "variable {} occurs in type {}", var.0, value.0)
            }
            UnifyError::BindingCycle { var } => {
                write!(f, "cyclic binding through variable {}", var.0)
            }
            UnifyError::DepthExceeded => f.write_str("unification depth limit exceeded"),
        }
    }
}

impl std::error::Error for UnifyError {}

impl From<BindingError> for UnifyError {
    fn from(err: BindingError) -> Self {
        match err {
            BindingError::Cycle { var } => UnifyError::BindingCycle { var },
        }
    }
}

impl BindingEnv {
    /// Make `pattern` consistent with `value`. Partial bindings stay on failure.
    pub fn unify(
        &mut self,
        db: &dyn TypeDatabase,
        pattern: TypeId,
        value: TypeId,
        variance: Variance,
    ) -> bool {
        self.try_unify(db, pattern, value, variance).is_ok()
    }

    /// [`unify`](Self::unify) reporting why it failed.
    pub fn try_unify(
        &mut self,
        db: &dyn TypeDatabase,
        pattern: TypeId,
        value: TypeId,
        variance: Variance,
    ) -> Result<(), UnifyError> {
        let env = self.id().0;
        let result = Unification::new(db, self).unify_impl(pattern, value, variance);
        match &result {
            Ok(()) => debug!(env, pattern = pattern.0, value = value.0, %variance, "unify succeeded"),
            Err(err) => debug!(env, pattern = pattern.0, value = value.0, %variance, %err, "unify failed"),
        }
        result
    }

    /// Like [`unify`](Self::unify), but restores the bindings on failure.
    pub fn unify_atomic(
        &mut self,
        db: &dyn TypeDatabase,
        pattern: TypeId,
        value: TypeId,
        variance: Variance,
    ) -> bool {
        let saved = self.substitutions();
        let ok = self.unify(db, pattern, value, variance);
        if !ok {
            self.set_substitutions(saved);
        }
        ok
    }

    /// Constrain `var` to `[lower, upper]`, intersecting with any existing bounds.
    pub fn unify_bounds(
        &mut self,
        db: &dyn TypeDatabase,
        var: TypeId,
        upper: TypeId,
        lower: TypeId,
    ) -> bool {
        self.try_unify_bounds(db, var, upper, lower).is_ok()
    }

    pub fn try_unify_bounds(
        &mut self,
        db: &dyn TypeDatabase,
        var: TypeId,
        upper: TypeId,
        lower: TypeId,
    ) -> Result<(), UnifyError> {
        let result = Unification::new(db, self).unify_bounds(var, upper, lower);
        if let Err(err) = &result {
            debug!(var = var.0, upper = upper.0, lower = lower.0, %err, "unify_bounds failed");
        }
        result
    }
}

/// State of one top-level unification.
struct Unification<'a> {
    db: &'a dyn TypeDatabase,
    env: &'a mut BindingEnv,
    depth: DepthCounter,
    /// Inside a position that is invariant by structure (pointee, array
    /// element, invariant type argument). Declared variances below it are
    /// ignored.
    pinned: bool,
}

impl<'a> Unification<'a> {
    fn new(db: &'a dyn TypeDatabase, env: &'a mut BindingEnv) -> Self {
        Self {
            db,
            env,
            depth: DepthCounter::with_profile(RecursionProfile::Unification),
            pinned: false,
        }
    }

    /// Unify a structurally invariant position.
    fn unify_pinned(&mut self, pattern: TypeId, value: TypeId) -> Result<(), UnifyError> {
        let outer = std::mem::replace(&mut self.pinned, true);
        let result = self.unify_impl(pattern, value, Variance::Invariant);
        self.pinned = outer;
        result
    }

    fn unify_impl(
        &mut self,
        pattern: TypeId,
        value: TypeId,
        variance: Variance,
    ) -> Result<(), UnifyError> {
        if pattern == value {
            return Ok(());
        }
        if !self.depth.enter() {
            warn!(pattern = pattern.0, value = value.0, "unify: depth limit exceeded");
            return Err(UnifyError::DepthExceeded);
        }
        let result = self.dispatch(pattern, value, variance);
        self.depth.leave();
        result
    }

    fn dispatch(
        &mut self,
        pattern: TypeId,
        value: TypeId,
        variance: Variance,
    ) -> Result<(), UnifyError> {
        let value = self.env.try_dereference(self.db, value)?;
        if pattern == value {
            return Ok(());
        }
        trace!(pattern = pattern.0, value = value.0, %variance, "unify_impl");

        let Some(data) = self.db.lookup(pattern) else {
            return Err(UnifyError::Mismatch { pattern, value });
        };
        match data {
            TypeData::PatternVar(_) => self.unify_pattern(pattern, value, variance),
            TypeData::PatternValue { env, var } if env == self.env.id() => {
                self.unify_pattern(var, value, variance)
            }
            TypeData::Address(inner) => self.unify_address_type(pattern, inner, value),
            TypeData::Pointer(inner) => self.unify_pointer_type(pattern, inner, value),
            TypeData::NativeArray { element, length } => {
                self.unify_native_array_type(pattern, element, length, value)
            }
            TypeData::TypeLiteral(inner) => self.unify_type_literal_type(pattern, inner, value),
            TypeData::Composite { def, args } => {
                self.unify_composite_type(pattern, def, args, value, variance)
            }
            TypeData::Tuple(elements) => self.unify_tuple_type(pattern, elements, value, variance),
            TypeData::Function { params, result } => {
                self.unify_function_type(pattern, params, result, value, variance)
            }
            TypeData::PatternValue { .. }
            | TypeData::Intrinsic(_)
            | TypeData::Constant(_)
            | TypeData::Union(_)
            | TypeData::Enum(_)
            | TypeData::ResultOf(_)
            | TypeData::ParameterOf { .. } => self.unify_equal(pattern, value),
        }
    }

    fn is_subtype(&self, source: TypeId, target: TypeId) -> bool {
        RelationChecker::new(self.db, &*self.env)
            .check_subtype(source, target)
            .is_true()
    }

    /// Fallback: no bindings, the types must be equal.
    fn unify_equal(&mut self, pattern: TypeId, value: TypeId) -> Result<(), UnifyError> {
        let pattern_now = self.env.subst(self.db, pattern);
        if is_equal(self.db, &*self.env, pattern_now, value).is_true() {
            Ok(())
        } else {
            Err(UnifyError::Mismatch { pattern, value })
        }
    }

    // =========================================================================
    // Pattern variables
    // =========================================================================

    fn unify_pattern(
        &mut self,
        var: TypeId,
        value: TypeId,
        variance: Variance,
    ) -> Result<(), UnifyError> {
        let var = self.env.representative(self.db, var)?;
        if var == value || self.env.as_own_var(self.db, value) == Some(var) {
            return Ok(());
        }
        if self.db.flags(value).contains(TypeFlags::CONTAINS_PATTERN_VAR)
            && contains_type(self.db, value, var)
        {
            return Err(UnifyError::OccursCheck { var, value });
        }

        let existing = self
            .env
            .get_substitution_for(var)
            .map(|subst| (subst.right(), subst.upper_bound(), subst.lower_bound()));
        let Some((right, upper, lower)) = existing else {
            self.bind_fresh(var, value, variance);
            return Ok(());
        };

        // `value` was dereferenced by the caller, so a variable here is unbound:
        // link it to `var` instead of comparing it against the bounds.
        if let Some(other) = self.env.as_own_var(self.db, value) {
            if let Some(right) = right
                && contains_type(self.db, right, other)
            {
                return Err(UnifyError::OccursCheck {
                    var: other,
                    value: right,
                });
            }
            trace!(var = var.0, other = other.0, "unify_pattern: link unbound variable");
            self.env.add_substitution(other, var);
            return Ok(());
        }

        if let Some(right) = right
            && self.db.flags(right).intersects(TypeFlags::HAS_VARIABLES)
        {
            // Bound to a partial type such as List[U]: unify through it.
            return self.unify_impl(right, value, variance);
        }
        self.narrow(var, right, upper, lower, value, variance)
    }

    /// The value is the lower bound, or the upper bound when a contravariant
    /// binding leaves no lower bound.
    fn bind_fresh(&mut self, var: TypeId, value: TypeId, variance: Variance) {
        let (upper, lower) = match variance {
            Variance::Invariant => (value, value),
            Variance::Covariant => (TypeId::ANY, value),
            Variance::Contravariant => (value, TypeId::NEVER),
        };
        self.env.push(var, Some(value), upper, lower);
    }

    /// Narrow an existing `[lower, upper]` binding of `var` by `value`.
    fn narrow(
        &mut self,
        var: TypeId,
        right: Option<TypeId>,
        upper: TypeId,
        lower: TypeId,
        value: TypeId,
        variance: Variance,
    ) -> Result<(), UnifyError> {
        match variance {
            Variance::Invariant => {
                if right == Some(value) {
                    return Ok(());
                }
                if !self.is_subtype(lower, value) || !self.is_subtype(value, upper) {
                    return Err(UnifyError::BoundsViolation { var, value });
                }
                self.env.push(var, Some(value), value, value);
            }
            Variance::Covariant => {
                let new_lower = if lower == TypeId::NEVER {
                    value
                } else {
                    join(self.db, &*self.env, lower, value)
                };
                if new_lower == lower {
                    return Ok(());
                }
                if !self.is_subtype(new_lower, upper) {
                    return Err(UnifyError::BoundsViolation { var, value });
                }
                self.env.push(var, Some(new_lower), upper, new_lower);
            }
            Variance::Contravariant => {
                let new_upper = if upper == TypeId::ANY {
                    value
                } else {
                    meet(self.db, &*self.env, upper, value).ok_or(UnifyError::EmptyInterval {
                        var,
                        upper: value,
                        lower,
                    })?
                };
                if new_upper == upper {
                    return Ok(());
                }
                if !self.is_subtype(lower, new_upper) {
                    return Err(UnifyError::EmptyInterval {
                        var,
                        upper: new_upper,
                        lower,
                    });
                }
                let new_right = if lower == TypeId::NEVER {
                    new_upper
                } else {
                    lower
                };
                self.env.push(var, Some(new_right), new_upper, lower);
            }
        }
        Ok(())
    }

    fn unify_bounds(&mut self, var: TypeId, upper: TypeId, lower: TypeId) -> Result<(), UnifyError> {
        let var = self.env.representative(self.db, var)?;
        let existing = self
            .env
            .get_substitution_for(var)
            .map(|subst| (subst.upper_bound(), subst.lower_bound()));

        let (new_upper, new_lower) = match existing {
            None => (upper, lower),
            Some((old_upper, old_lower)) => {
                let new_upper = meet(self.db, &*self.env, old_upper, upper).ok_or(
                    UnifyError::EmptyInterval {
                        var,
                        upper,
                        lower: old_lower,
                    },
                )?;
                let new_lower = join(self.db, &*self.env, old_lower, lower);
                if new_upper == old_upper && new_lower == old_lower {
                    return Ok(());
                }
                (new_upper, new_lower)
            }
        };
        if !self.is_subtype(new_lower, new_upper) {
            return Err(UnifyError::EmptyInterval {
                var,
                upper: new_upper,
                lower: new_lower,
            });
        }
        self.env.add_substitution_bounded(var, new_upper, new_lower);
        Ok(())
    }

    // =========================================================================
    // Structural cases
    // =========================================================================

    fn unify_address_type(
        &mut self,
        pattern: TypeId,
        pointee: TypeId,
        value: TypeId,
    ) -> Result<(), UnifyError> {
        match self.db.lookup(value) {
            Some(TypeData::Address(value_pointee)) => self.unify_pinned(pointee, value_pointee),
            _ => Err(UnifyError::Mismatch { pattern, value }),
        }
    }

    fn unify_pointer_type(
        &mut self,
        pattern: TypeId,
        pointee: TypeId,
        value: TypeId,
    ) -> Result<(), UnifyError> {
        match self.db.lookup(value) {
            Some(TypeData::Pointer(value_pointee)) => self.unify_pinned(pointee, value_pointee),
            _ => Err(UnifyError::Mismatch { pattern, value }),
        }
    }

    fn unify_native_array_type(
        &mut self,
        pattern: TypeId,
        element: TypeId,
        length: TypeId,
        value: TypeId,
    ) -> Result<(), UnifyError> {
        let Some(TypeData::NativeArray {
            element: value_element,
            length: value_length,
        }) = self.db.lookup(value)
        else {
            return Err(UnifyError::Mismatch { pattern, value });
        };
        self.unify_pinned(length, value_length)?;
        self.unify_pinned(element, value_element)
    }

    fn unify_type_literal_type(
        &mut self,
        pattern: TypeId,
        inner: TypeId,
        value: TypeId,
    ) -> Result<(), UnifyError> {
        match self.db.lookup(value) {
            Some(TypeData::TypeLiteral(value_inner)) => self.unify_pinned(inner, value_inner),
            _ => Err(UnifyError::Mismatch { pattern, value }),
        }
    }

    /// Composite against composite.
    ///
    /// Under covariance the value may be a subclass of the pattern's
    /// declaration; under contravariance the pattern may be a subclass of the
    /// value's declaration. Arguments are then unified pairwise with each
    /// parameter's declared variance composed with `variance`. Below a
    /// structurally invariant position every argument is invariant.
    fn unify_composite_type(
        &mut self,
        pattern: TypeId,
        def: DefId,
        args: TypeListId,
        value: TypeId,
        variance: Variance,
    ) -> Result<(), UnifyError> {
        let mismatch = UnifyError::Mismatch { pattern, value };
        let Some(TypeData::Composite {
            def: value_def,
            args: value_args,
        }) = self.db.lookup(value)
        else {
            return Err(mismatch);
        };

        let (common_def, pattern_args, value_args) = if def == value_def {
            (def, args, value_args)
        } else {
            let composite_args = |ty: TypeId| match self.db.lookup(ty) {
                Some(TypeData::Composite { args, .. }) => Some(args),
                _ => None,
            };
            match variance {
                Variance::Covariant => {
                    let upcast_args = upcast(self.db, value, def)
                        .and_then(composite_args)
                        .ok_or_else(|| mismatch.clone())?;
                    (def, args, upcast_args)
                }
                Variance::Contravariant => {
                    let upcast_args = upcast(self.db, pattern, value_def)
                        .and_then(composite_args)
                        .ok_or_else(|| mismatch.clone())?;
                    (value_def, upcast_args, value_args)
                }
                Variance::Invariant => return Err(mismatch),
            }
        };

        let pattern_args = self.db.type_list(pattern_args);
        let value_args = self.db.type_list(value_args);
        if pattern_args.len() != value_args.len() {
            return Err(mismatch);
        }
        let definition = self.db.definition(common_def);
        for (index, (&pattern_arg, &value_arg)) in pattern_args.iter().zip(value_args.iter()).enumerate() {
            let declared = definition
                .as_ref()
                .map(|definition| definition.param_variance(index))
                .unwrap_or_default();
            let arg_variance = if self.pinned {
                Variance::Invariant
            } else {
                Variance::compose(declared, variance)
            };
            if arg_variance.is_invariant() {
                self.unify_pinned(pattern_arg, value_arg)?;
            } else {
                self.unify_impl(pattern_arg, value_arg, arg_variance)?;
            }
        }
        Ok(())
    }

    fn unify_tuple_type(
        &mut self,
        pattern: TypeId,
        elements: TypeListId,
        value: TypeId,
        variance: Variance,
    ) -> Result<(), UnifyError> {
        let Some(TypeData::Tuple(value_elements)) = self.db.lookup(value) else {
            return Err(UnifyError::Mismatch { pattern, value });
        };
        let elements = self.db.type_list(elements);
        let value_elements = self.db.type_list(value_elements);
        if elements.len() != value_elements.len() {
            return Err(UnifyError::Mismatch { pattern, value });
        }
        for (&element, &value_element) in elements.iter().zip(value_elements.iter()) {
            self.unify_impl(element, value_element, variance)?;
        }
        Ok(())
    }

    fn unify_function_type(
        &mut self,
        pattern: TypeId,
        params: TypeListId,
        result: TypeId,
        value: TypeId,
        variance: Variance,
    ) -> Result<(), UnifyError> {
        let Some(TypeData::Function {
            params: value_params,
            result: value_result,
        }) = self.db.lookup(value)
        else {
            return Err(UnifyError::Mismatch { pattern, value });
        };
        let params = self.db.type_list(params);
        let value_params = self.db.type_list(value_params);
        if params.len() != value_params.len() {
            return Err(UnifyError::Mismatch { pattern, value });
        }
        for (&param, &value_param) in params.iter().zip(value_params.iter()) {
            self.unify_impl(param, value_param, variance.flip())?;
        }
        self.unify_impl(result, value_result, variance)
    }
}

#[cfg(test)]
#[path = "../tests/unify_tests.rs"]
mod unify_tests;
