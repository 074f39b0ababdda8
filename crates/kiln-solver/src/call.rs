//! Overloaded call sites.
//!
//! A [`CallSite`] collects the candidate functions an overloaded call may
//! resolve to. Each [`CallCandidate`] carries its own [`BindingEnv`], so the
//! same generic signature can be matched against the arguments independently
//! per candidate. Candidates that stop matching are culled; when only one
//! answer remains for a parameter (or the result), the call is said to have a
//! singular type at that position.
//!
//! [`CallTable`] owns the call sites of one analysis unit and hands out the
//! [`CallId`]s referenced by `ResultOf` / `ParameterOf` nodes.

use crate::binding::{BindingEnv, EnvStack};
use crate::db::TypeDatabase;
use crate::relation::is_equal;
use crate::types::{CallId, TypeData, TypeId};
use crate::variance::Variance;
use tracing::{debug, trace};

// =============================================================================
// CallCandidate
// =============================================================================

/// One overload a call may resolve to.
#[derive(Debug)]
pub struct CallCandidate {
    function: TypeId,
    env: BindingEnv,
    /// For constructors, the type being constructed.
    self_type: Option<TypeId>,
    culled: bool,
}

impl CallCandidate {
    pub fn new(function: TypeId) -> Self {
        Self {
            function,
            env: BindingEnv::new(),
            self_type: None,
            culled: false,
        }
    }

    /// A constructor candidate; its result type is `self_type`.
    pub fn constructor(function: TypeId, self_type: TypeId) -> Self {
        Self {
            self_type: Some(self_type),
            ..Self::new(function)
        }
    }

    /// Start from existing bindings, e.g. explicit type arguments.
    pub fn with_env(mut self, env: BindingEnv) -> Self {
        self.env = env;
        self
    }

    pub fn function_type(&self) -> TypeId {
        self.function
    }

    pub fn env(&self) -> &BindingEnv {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut BindingEnv {
        &mut self.env
    }

    pub fn is_constructor(&self) -> bool {
        self.self_type.is_some()
    }

    pub fn is_culled(&self) -> bool {
        self.culled
    }

    pub fn cull(&mut self) {
        self.culled = true;
    }

    fn signature(&self, db: &dyn TypeDatabase) -> Option<(std::sync::Arc<[TypeId]>, TypeId)> {
        match db.lookup(self.function) {
            Some(TypeData::Function { params, result }) => Some((db.type_list(params), result)),
            _ => None,
        }
    }

    pub fn param_count(&self, db: &dyn TypeDatabase) -> usize {
        self.signature(db).map_or(0, |(params, _)| params.len())
    }

    /// Parameter `index` with this candidate's bindings applied.
    pub fn param_type(&self, db: &dyn TypeDatabase, index: usize) -> Option<TypeId> {
        let (params, _) = self.signature(db)?;
        let param = *params.get(index)?;
        Some(self.env.subst(db, param))
    }

    /// The result type with this candidate's bindings applied. A constructor
    /// yields its self type.
    pub fn result_type(&self, db: &dyn TypeDatabase) -> Option<TypeId> {
        let declared = match self.self_type {
            Some(self_type) => self_type,
            None => self.signature(db)?.1,
        };
        Some(self.env.subst(db, declared))
    }

    /// Match argument `index` against its parameter: the argument must be
    /// usable where the parameter is expected. Bindings are kept only on
    /// success.
    pub fn unify_argument(&mut self, db: &dyn TypeDatabase, index: usize, arg: TypeId) -> bool {
        let Some(param) = self.signature(db).and_then(|(params, _)| params.get(index).copied())
        else {
            return false;
        };
        self.env.unify_atomic(db, param, arg, Variance::Covariant)
    }
}

// =============================================================================
// CallSite
// =============================================================================

#[derive(Debug)]
pub struct CallSite {
    id: CallId,
    /// Printable callee name for diagnostics.
    name: String,
    candidates: Vec<CallCandidate>,
}

impl CallSite {
    pub fn id(&self) -> CallId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[CallCandidate] {
        &self.candidates
    }

    pub fn candidate_mut(&mut self, index: usize) -> Option<&mut CallCandidate> {
        self.candidates.get_mut(index)
    }

    pub fn add_candidate(&mut self, candidate: CallCandidate) {
        self.candidates.push(candidate);
    }

    pub fn live_candidates(&self) -> impl Iterator<Item = &CallCandidate> {
        self.candidates.iter().filter(|candidate| !candidate.is_culled())
    }

    pub fn live_count(&self) -> usize {
        self.live_candidates().count()
    }

    pub fn has_any_candidates(&self) -> bool {
        self.live_candidates().next().is_some()
    }

    /// The only live candidate, if exactly one remains.
    pub fn singular_candidate(&self) -> Option<&CallCandidate> {
        let mut live = self.live_candidates();
        let first = live.next()?;
        live.next().is_none().then_some(first)
    }

    /// Cull candidate `index`. Returns false if it does not exist.
    pub fn cull(&mut self, index: usize) -> bool {
        let Some(candidate) = self.candidates.get_mut(index) else {
            return false;
        };
        candidate.cull();
        debug!(call = self.id.0, candidate = index, "cull candidate");
        true
    }

    /// Cull every live candidate that does not take exactly `arg_count`
    /// arguments. Returns how many were culled.
    pub fn cull_arity_mismatch(&mut self, db: &dyn TypeDatabase, arg_count: usize) -> usize {
        let mut culled = 0;
        for candidate in self.candidates.iter_mut().filter(|c| !c.is_culled()) {
            if candidate.param_count(db) != arg_count {
                candidate.cull();
                culled += 1;
            }
        }
        debug!(call = self.id.0, arg_count, culled, "cull_arity_mismatch");
        culled
    }

    /// Match argument `index` against every live candidate, culling those
    /// that reject it. Returns how many were culled.
    pub fn cull_by_argument(&mut self, db: &dyn TypeDatabase, index: usize, arg: TypeId) -> usize {
        let mut culled = 0;
        for candidate in self.candidates.iter_mut().filter(|c| !c.is_culled()) {
            if !candidate.unify_argument(db, index, arg) {
                candidate.cull();
                culled += 1;
            }
        }
        debug!(call = self.id.0, index, arg = arg.0, culled, "cull_by_argument");
        culled
    }

    /// Every live candidate's environment, for comparing their types.
    fn live_envs(&self) -> EnvStack<'_> {
        let mut envs = EnvStack::new();
        for candidate in self.live_candidates() {
            envs.push(candidate.env());
        }
        envs
    }

    /// The one type all live candidates agree on, given a per-candidate type.
    ///
    /// `None` when no candidate is live, when a candidate has no type at the
    /// position, or when two candidates disagree.
    fn singular_by(
        &self,
        db: &dyn TypeDatabase,
        type_of: impl Fn(&CallCandidate) -> Option<TypeId>,
    ) -> Option<TypeId> {
        let envs = self.live_envs();
        let mut singular: Option<TypeId> = None;
        for candidate in self.live_candidates() {
            let ty = type_of(candidate)?;
            match singular {
                None => singular = Some(ty),
                Some(current) if is_equal(db, &envs, ty, current).is_true() => {}
                Some(_) => return None,
            }
        }
        singular
    }

    /// The type of parameter `index`, if every live candidate agrees on it.
    pub fn singular_param_type(&self, db: &dyn TypeDatabase, index: usize) -> Option<TypeId> {
        let ty = self.singular_by(db, |candidate| candidate.param_type(db, index));
        trace!(call = self.id.0, index, ty = ?ty.map(|t| t.0), "singular_param_type");
        ty
    }

    /// The result type, if every live candidate agrees on it.
    pub fn singular_result_type(&self, db: &dyn TypeDatabase) -> Option<TypeId> {
        let ty = self.singular_by(db, |candidate| candidate.result_type(db));
        trace!(call = self.id.0, ty = ?ty.map(|t| t.0), "singular_result_type");
        ty
    }
}

// =============================================================================
// CallTable
// =============================================================================

/// Arena of the call sites of one analysis unit.
#[derive(Debug, Default)]
pub struct CallTable {
    sites: Vec<CallSite>,
}

impl CallTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_call(&mut self, name: impl Into<String>, candidates: Vec<CallCandidate>) -> CallId {
        let id = CallId(self.sites.len() as u32);
        let name = name.into();
        trace!(call = id.0, %name, candidates = candidates.len(), "CallTable::add_call");
        self.sites.push(CallSite {
            id,
            name,
            candidates,
        });
        id
    }

    pub fn get(&self, call: CallId) -> Option<&CallSite> {
        self.sites.get(call.0 as usize)
    }

    pub fn get_mut(&mut self, call: CallId) -> Option<&mut CallSite> {
        self.sites.get_mut(call.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// The call's singular result type, or a `ResultOf` node standing for it.
    pub fn result_type_or_deferred(&self, db: &dyn TypeDatabase, call: CallId) -> TypeId {
        self.get(call)
            .and_then(|site| site.singular_result_type(db))
            .unwrap_or_else(|| db.result_of(call))
    }

    /// The call's singular type for parameter `index`, or a `ParameterOf`
    /// node standing for it.
    pub fn param_type_or_deferred(&self, db: &dyn TypeDatabase, call: CallId, index: u32) -> TypeId {
        self.get(call)
            .and_then(|site| site.singular_param_type(db, index as usize))
            .unwrap_or_else(|| db.parameter_of(call, index))
    }
}

#[cfg(test)]
#[path = "../tests/call_tests.rs"]
mod call_tests;
