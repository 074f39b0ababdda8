//! Centralized limits and thresholds for the solver.
//!
//! Shared constants for recursion depths and operation counts. Named presets
//! built on these values live in `kiln_solver::recursion::RecursionProfile`.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth of a single unification walk.
///
/// Each structural step (pointer pointee, array element, generic argument,
/// re-unification of an existing binding) adds one level. Exceeding it makes
/// the unification fail instead of overflowing the stack.
pub const MAX_UNIFY_DEPTH: u32 = 128;

/// Maximum nesting depth when rewriting a type through an environment.
///
/// Applies to `BindingEnv::subst`, pattern-value resolution and deferred
/// constraint rewriting.
pub const MAX_SUBST_DEPTH: u32 = 128;

/// Maximum nesting depth of structural relation queries (equality, subtyping,
/// join/meet, conversion ranking).
pub const MAX_RELATION_DEPTH: u32 = 100;

/// Maximum depth when walking a declaration's ancestors.
pub const MAX_HIERARCHY_DEPTH: u32 = 64;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Total step budget for one recursive walk.
pub const MAX_WALK_ITERATIONS: u32 = 100_000;

/// Maximum number of rewrite passes when resolving deferred constraints that
/// resolve to types which themselves contain deferred constraints.
pub const MAX_DEFERRED_RESOLUTION_PASSES: u32 = 16;
