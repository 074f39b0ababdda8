//! Binding and Unification Solver
//!
//! This crate implements the type-inference core used when a generic
//! declaration is applied at a concrete use site:
//!
//! - **Type graph**: structural `TypeData` interned into `TypeId` handles
//! - **Binding environments**: persistent substitution chains with upper and
//!   lower bounds, narrowed by variance-aware unification
//! - **Pattern values**: type nodes standing for a variable's current value
//! - **Deferred constraints**: `ResultOf` / `ParameterOf` nodes for calls whose
//!   overload is not decided yet
//!
//! Key properties:
//! - O(1) type equality via interning (`TypeId` comparison)
//! - Bounded recursion everywhere; limits fail queries instead of overflowing
//! - Failures are values (`UnifyError`, `SubtypeResult::Unknown`,
//!   `OverloadError`), never panics
pub mod binding;
pub mod call;
pub mod constraint;
pub mod conversion;
mod db;
pub mod def;
mod diagnostics;
mod format;
pub mod hierarchy;
mod instantiate;
mod intern;
pub mod layout;
pub mod pattern_value;
pub mod recursion;
pub mod relation;
pub mod type_queries;
pub mod types;
mod unify;
pub mod variance;
pub mod visitor;

pub use binding::{
    BindingEntry, BindingEnv, BindingEnvDisplay, BindingError, BindingLookup, BindingSnapshot,
    EnvStack, NoBindings, Substitution, SubstitutionIter,
};
pub use call::{CallCandidate, CallSite, CallTable};
pub use constraint::{
    ConstraintResolution, DeferredConstraint, OverloadError, collect_deferred, finalize_deferred,
    resolve_deferred_types,
};
pub use conversion::{ConversionRank, rank_conversion};
pub use db::TypeDatabase;
pub use def::{DefId, DefKind, Definition, DefinitionStore, TypeParamInfo};
pub use diagnostics::DiagnosticBuilder;
pub use format::TypeFormatter;
pub use instantiate::{MAX_INSTANTIATION_DEPTH, TypeSubstitution, instantiate_type};
pub use intern::TypeInterner;
pub use layout::{IrShape, ir_shape};
pub use pattern_value::PatternValue;
pub use relation::{RelationChecker, SubtypeResult, includes, is_equal, is_subtype, join, meet};
pub use types::*;
pub use unify::UnifyError;
pub use variance::Variance;
