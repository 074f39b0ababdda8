//! Binding environments.
//!
//! A [`BindingEnv`] records what each pattern variable of a generic signature
//! is bound to while that signature is matched against a concrete use. The
//! bindings form a persistent, newest-first chain of [`Substitution`]
//! records:
//!
//! - records are immutable and shared through `Arc`
//! - narrowing a binding prepends a new record for the same variable, which
//!   shadows the older one
//! - [`BindingEnv::fork`] starts a new environment sharing the current chain;
//!   later additions on either side are invisible to the other
//!
//! Saving and restoring the chain head (`substitutions` /
//! `set_substitutions`) is therefore a cheap snapshot.

use crate::db::TypeDatabase;
use crate::format::TypeFormatter;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{EnvId, TypeData, TypeFlags, TypeId};
use crate::visitor::map_children;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{trace, warn};

/// Global counter for environment identities.
static NEXT_ENV_ID: AtomicU32 = AtomicU32::new(1);

// =============================================================================
// Substitution
// =============================================================================

/// One binding of a pattern variable, with the bounds it must stay within.
///
/// "No upper bound" is `any` and "no lower bound" is `never`.
#[derive(Debug)]
pub struct Substitution {
    left: TypeId,
    right: Option<TypeId>,
    upper_bound: TypeId,
    lower_bound: TypeId,
    prev: Option<Arc<Substitution>>,
}

impl Substitution {
    /// The pattern side, typically a pattern variable.
    pub fn left(&self) -> TypeId {
        self.left
    }

    /// Current best-known value; `None` when unconstrained.
    pub fn right(&self) -> Option<TypeId> {
        self.right
    }

    pub fn upper_bound(&self) -> TypeId {
        self.upper_bound
    }

    pub fn lower_bound(&self) -> TypeId {
        self.lower_bound
    }

    /// The next older record.
    pub fn prev(&self) -> Option<&Arc<Substitution>> {
        self.prev.as_ref()
    }

    /// Whether the record pins a single type (`lower == upper == right`).
    pub fn is_exact(&self) -> bool {
        self.right == Some(self.lower_bound) && self.lower_bound == self.upper_bound
    }
}

/// The best-known value implied by a pair of bounds.
fn right_from_bounds(upper: TypeId, lower: TypeId) -> Option<TypeId> {
    if lower != TypeId::NEVER {
        Some(lower)
    } else if upper != TypeId::ANY {
        Some(upper)
    } else {
        None
    }
}

/// Iterator over a substitution chain, newest first.
pub struct SubstitutionIter<'a> {
    next: Option<&'a Arc<Substitution>>,
}

impl<'a> Iterator for SubstitutionIter<'a> {
    type Item = &'a Substitution;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.prev.as_ref();
        Some(current)
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingError {
    /// Following variable-to-variable bindings returned to `var`.
    Cycle { var: TypeId },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::Cycle { var } => {
                write!(f, "cyclic binding through pattern variable {}", var.0)
            }
        }
    }
}

impl std::error::Error for BindingError {}

// =============================================================================
// BindingLookup
// =============================================================================

/// Resolution of pattern value nodes for relation queries.
pub trait BindingLookup {
    /// Current value of `var` in environment `env`, or `None` when that
    /// environment is not visible here or has no binding for `var`.
    fn resolve_pattern_value(
        &self,
        db: &dyn TypeDatabase,
        env: EnvId,
        var: TypeId,
    ) -> Option<TypeId>;
}

/// A lookup that knows no environments: every pattern value is unresolved.
pub struct NoBindings;

impl BindingLookup for NoBindings {
    fn resolve_pattern_value(&self, _: &dyn TypeDatabase, _: EnvId, _: TypeId) -> Option<TypeId> {
        None
    }
}

/// Several environments at once, e.g. every candidate of an overloaded call.
#[derive(Default)]
pub struct EnvStack<'a> {
    envs: SmallVec<[&'a BindingEnv; 4]>,
}

impl<'a> EnvStack<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, env: &'a BindingEnv) {
        self.envs.push(env);
    }
}

impl BindingLookup for EnvStack<'_> {
    fn resolve_pattern_value(
        &self,
        db: &dyn TypeDatabase,
        env: EnvId,
        var: TypeId,
    ) -> Option<TypeId> {
        self.envs
            .iter()
            .find(|candidate| candidate.id() == env)
            .and_then(|candidate| candidate.resolve_pattern_value(db, env, var))
    }
}

// =============================================================================
// BindingEnv
// =============================================================================

/// Variable-to-type bindings produced by unification.
///
/// Not `Clone`: sharing a chain is explicit through [`fork`](Self::fork),
/// which also gives the new environment its own identity.
#[derive(Debug)]
pub struct BindingEnv {
    id: EnvId,
    head: Option<Arc<Substitution>>,
}

impl Default for BindingEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingEnv {
    pub fn new() -> Self {
        let id = EnvId(NEXT_ENV_ID.fetch_add(1, Ordering::Relaxed));
        trace!(env = id.0, "BindingEnv::new");
        Self { id, head: None }
    }

    /// Identity referenced by this environment's pattern value nodes.
    pub fn id(&self) -> EnvId {
        self.id
    }

    /// A new environment that starts with this environment's bindings.
    pub fn fork(&self) -> Self {
        let forked = Self {
            id: EnvId(NEXT_ENV_ID.fetch_add(1, Ordering::Relaxed)),
            head: self.head.clone(),
        };
        trace!(parent = self.id.0, env = forked.id.0, "BindingEnv::fork");
        forked
    }

    /// True iff there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Drop all bindings.
    pub fn reset(&mut self) {
        self.head = None;
    }

    /// The chain head, for snapshot/restore.
    pub fn substitutions(&self) -> Option<Arc<Substitution>> {
        self.head.clone()
    }

    pub fn set_substitutions(&mut self, head: Option<Arc<Substitution>>) {
        self.head = head;
    }

    pub fn iter(&self) -> SubstitutionIter<'_> {
        SubstitutionIter {
            next: self.head.as_ref(),
        }
    }

    /// Newest record whose left side is `left`.
    pub fn get_substitution_for(&self, left: TypeId) -> Option<&Substitution> {
        self.iter().find(|subst| subst.left == left)
    }

    /// Current value bound to `var`, without following further bindings.
    pub fn get(&self, var: TypeId) -> Option<TypeId> {
        self.get_substitution_for(var).and_then(Substitution::right)
    }

    /// Bind `left` to exactly `right`. Does not check for an existing binding.
    pub fn add_substitution(&mut self, left: TypeId, right: TypeId) -> Arc<Substitution> {
        self.push(left, Some(right), right, right)
    }

    /// Bind `left` within `[lower, upper]`. Does not check for an existing binding.
    ///
    /// The value is the lower bound when there is one, else the upper bound.
    pub fn add_substitution_bounded(
        &mut self,
        left: TypeId,
        upper: TypeId,
        lower: TypeId,
    ) -> Arc<Substitution> {
        self.push(left, right_from_bounds(upper, lower), upper, lower)
    }

    pub(crate) fn push(
        &mut self,
        left: TypeId,
        right: Option<TypeId>,
        upper_bound: TypeId,
        lower_bound: TypeId,
    ) -> Arc<Substitution> {
        trace!(
            env = self.id.0,
            left = left.0,
            right = ?right.map(|ty| ty.0),
            upper = upper_bound.0,
            lower = lower_bound.0,
            "BindingEnv::push"
        );
        let record = Arc::new(Substitution {
            left,
            right,
            upper_bound,
            lower_bound,
            prev: self.head.take(),
        });
        self.head = Some(Arc::clone(&record));
        record
    }

    /// If `ty` is a pattern variable of this environment (or this environment's
    /// pattern value node), the variable it names.
    pub(crate) fn as_own_var(&self, db: &dyn TypeDatabase, ty: TypeId) -> Option<TypeId> {
        match db.lookup(ty) {
            Some(TypeData::PatternVar(_)) => Some(ty),
            Some(TypeData::PatternValue { env, var }) if env == self.id => Some(var),
            _ => None,
        }
    }

    /// Follow variable-to-variable bindings from `ty`.
    ///
    /// Stops at the first type that is not a bound variable. A chain that
    /// returns to a variable already visited is a [`BindingError::Cycle`].
    pub fn try_dereference(&self, db: &dyn TypeDatabase, ty: TypeId) -> Result<TypeId, BindingError> {
        let mut current = ty;
        let mut visited: FxHashSet<TypeId> = FxHashSet::default();
        while let Some(var) = self.as_own_var(db, current) {
            let Some(next) = self.get(var) else {
                return Ok(current);
            };
            if !visited.insert(var) {
                return Err(BindingError::Cycle { var });
            }
            current = next;
        }
        Ok(current)
    }

    /// [`try_dereference`](Self::try_dereference) with cycles mapped to `error`.
    pub fn dereference(&self, db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
        self.try_dereference(db, ty).unwrap_or_else(|err| {
            warn!(env = self.id.0, %err, "BindingEnv::dereference");
            TypeId::ERROR
        })
    }

    /// The last variable of a variable-to-variable chain starting at `var`.
    ///
    /// Its record (if any) binds it to something other than a variable.
    pub(crate) fn representative(
        &self,
        db: &dyn TypeDatabase,
        var: TypeId,
    ) -> Result<TypeId, BindingError> {
        let mut current = var;
        let mut visited: FxHashSet<TypeId> = FxHashSet::default();
        while let Some(next) = self.get(current).and_then(|next| self.as_own_var(db, next)) {
            if !visited.insert(current) {
                return Err(BindingError::Cycle { var: current });
            }
            current = next;
        }
        Ok(current)
    }

    /// The proxy node standing for `var` in this environment.
    pub fn pattern_value(&self, db: &dyn TypeDatabase, var: TypeId) -> TypeId {
        db.pattern_value(self.id, var)
    }

    /// Replace every bound pattern variable (and this environment's bound
    /// pattern values) inside `ty` with its value.
    ///
    /// Returns `ty` itself, interning nothing, when it contains no variables.
    pub fn subst(&self, db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
        if !db.flags(ty).intersects(TypeFlags::HAS_VARIABLES) {
            return ty;
        }
        let mut depth = DepthCounter::with_profile(RecursionProfile::Substitution);
        self.subst_inner(db, ty, &mut depth)
    }

    fn subst_inner(&self, db: &dyn TypeDatabase, ty: TypeId, depth: &mut DepthCounter) -> TypeId {
        if !db.flags(ty).intersects(TypeFlags::HAS_VARIABLES) {
            return ty;
        }
        if !depth.enter() {
            warn!(env = self.id.0, type_id = ty.0, "BindingEnv::subst: depth limit exceeded");
            return TypeId::ERROR;
        }
        let result = match db.lookup(ty) {
            Some(TypeData::PatternVar(_)) => {
                let value = self.dereference(db, ty);
                if value == ty {
                    ty
                } else {
                    self.subst_inner(db, value, depth)
                }
            }
            Some(TypeData::PatternValue { env, var }) if env == self.id => {
                let value = self.dereference(db, var);
                if value == var {
                    ty
                } else {
                    self.subst_inner(db, value, depth)
                }
            }
            Some(TypeData::PatternValue { .. }) => ty,
            _ => map_children(db, ty, &mut |child| self.subst_inner(db, child, depth)),
        };
        depth.leave();
        result
    }

    /// Latest record per variable, newest first.
    fn live_substitutions(&self) -> IndexMap<TypeId, &Substitution> {
        let mut live: IndexMap<TypeId, &Substitution> = IndexMap::new();
        for subst in self.iter() {
            live.entry(subst.left).or_insert(subst);
        }
        live
    }

    /// Human-readable dump of the live bindings, e.g. `{T = Array[int32]}`.
    pub fn display<'a>(&'a self, db: &'a dyn TypeDatabase) -> BindingEnvDisplay<'a> {
        BindingEnvDisplay { env: self, db }
    }

    /// Serializable dump of the live bindings.
    pub fn snapshot(&self, db: &dyn TypeDatabase) -> BindingSnapshot {
        let formatter = TypeFormatter::new(db);
        let bindings = self
            .live_substitutions()
            .into_values()
            .map(|subst| BindingEntry {
                var: formatter.format(subst.left),
                value: subst.right.map(|ty| formatter.format(ty)),
                upper_bound: formatter.format(subst.upper_bound),
                lower_bound: formatter.format(subst.lower_bound),
            })
            .collect();
        BindingSnapshot {
            env: self.id.0,
            bindings,
        }
    }
}

impl BindingLookup for BindingEnv {
    fn resolve_pattern_value(
        &self,
        db: &dyn TypeDatabase,
        env: EnvId,
        var: TypeId,
    ) -> Option<TypeId> {
        if env != self.id {
            return None;
        }
        self.get(var).map(|value| self.dereference(db, value))
    }
}

// =============================================================================
// Dumps
// =============================================================================

pub struct BindingEnvDisplay<'a> {
    env: &'a BindingEnv,
    db: &'a dyn TypeDatabase,
}

impl fmt::Display for BindingEnvDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatter = TypeFormatter::new(self.db);
        f.write_str("{")?;
        for (index, subst) in self.env.live_substitutions().into_values().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            let var = formatter.format(subst.left);
            match subst.right {
                Some(value) => write!(f, "{var} = {}", formatter.format(value))?,
                None => write!(f, "{var} = ?")?,
            }
            if subst.upper_bound != TypeId::ANY && Some(subst.upper_bound) != subst.right {
                write!(f, " <: {}", formatter.format(subst.upper_bound))?;
            }
            if subst.lower_bound != TypeId::NEVER && Some(subst.lower_bound) != subst.right {
                write!(f, " :> {}", formatter.format(subst.lower_bound))?;
            }
        }
        f.write_str("}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BindingEntry {
    pub var: String,
    pub value: Option<String>,
    pub upper_bound: String,
    pub lower_bound: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BindingSnapshot {
    pub env: u32,
    pub bindings: Vec<BindingEntry>,
}

#[cfg(test)]
#[path = "../tests/binding_tests.rs"]
mod binding_tests;
