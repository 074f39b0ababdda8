//! Pattern-value proxies.
//!
//! A `TypeData::PatternValue { env, var }` node stands for "whatever `var`
//! currently resolves to in `env`". The node itself is an ordinary interned
//! type, so it can appear inside any other type. [`PatternValue`] is the view
//! used to ask questions about one such node: every query forwards to the
//! current value, and an unbound variable answers "unknown" instead of
//! failing.

use crate::binding::BindingEnv;
use crate::conversion::{ConversionRank, rank_conversion};
use crate::db::TypeDatabase;
use crate::format::TypeFormatter;
use crate::layout::{IrShape, ir_shape};
use crate::relation::{SubtypeResult, includes, is_equal, is_subtype};
use crate::type_queries;
use crate::types::{TypeData, TypeId};

/// A pattern variable seen through the environment that binds it.
#[derive(Clone, Copy)]
pub struct PatternValue<'a> {
    db: &'a dyn TypeDatabase,
    env: &'a BindingEnv,
    var: TypeId,
    node: TypeId,
}

impl<'a> PatternValue<'a> {
    /// The proxy for `var` in `env`, interning its node on first use.
    pub fn new(db: &'a dyn TypeDatabase, env: &'a BindingEnv, var: TypeId) -> Self {
        Self {
            db,
            env,
            var,
            node: env.pattern_value(db, var),
        }
    }

    /// View an existing type as a proxy of `env`. `None` for any other type,
    /// including proxies of other environments.
    pub fn from_type(db: &'a dyn TypeDatabase, env: &'a BindingEnv, ty: TypeId) -> Option<Self> {
        match db.lookup(ty) {
            Some(TypeData::PatternValue { env: owner, var }) if owner == env.id() => Some(Self {
                db,
                env,
                var,
                node: ty,
            }),
            _ => None,
        }
    }

    pub fn var(&self) -> TypeId {
        self.var
    }

    /// The interned proxy node.
    pub fn node(&self) -> TypeId {
        self.node
    }

    /// The value currently bound to the variable, with variable chains
    /// followed. `None` while unbound.
    pub fn value(&self) -> Option<TypeId> {
        self.env
            .get(self.var)
            .map(|value| self.env.dereference(self.db, value))
    }

    /// True only when the variable resolves to a fully settled type.
    pub fn is_singular(&self) -> bool {
        self.value()
            .is_some_and(|value| type_queries::is_singular(self.db, value))
    }

    pub fn is_equal(&self, other: TypeId) -> SubtypeResult {
        is_equal(self.db, self.env, self.node, other)
    }

    /// `self <: other`.
    pub fn is_subtype(&self, other: TypeId) -> SubtypeResult {
        is_subtype(self.db, self.env, self.node, other)
    }

    /// Whether every value of `other` is a value of this proxy's type.
    pub fn includes(&self, other: TypeId) -> SubtypeResult {
        includes(self.db, self.env, self.node, other)
    }

    /// Rank converting a `from` value into this proxy's type.
    pub fn convert_from(&self, from: TypeId) -> Option<ConversionRank> {
        rank_conversion(self.db, self.env, from, self.node)
    }

    /// Rank converting a value of this proxy's type into a `to` slot.
    pub fn convert_to(&self, to: TypeId) -> Option<ConversionRank> {
        rank_conversion(self.db, self.env, self.node, to)
    }

    /// `None` while unbound.
    pub fn is_reference_type(&self) -> Option<bool> {
        self.value()
            .map(|value| type_queries::is_reference_type(self.db, value))
    }

    pub fn ir_shape(&self) -> Option<IrShape> {
        ir_shape(self.db, self.env, self.node)
    }

    /// The bound value when there is one, else `%T`.
    pub fn format(&self) -> String {
        TypeFormatter::new(self.db)
            .with_bindings(self.env)
            .format(self.node)
    }
}

impl std::fmt::Debug for PatternValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternValue")
            .field("env", &self.env.id())
            .field("var", &self.var)
            .field("value", &self.value())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/pattern_value_tests.rs"]
mod pattern_value_tests;
