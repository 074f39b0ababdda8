//! Common types and utilities for the kiln type solver.
//!
//! This crate provides foundational pieces shared by the solver crates:
//! - String interning (`Atom`, `Interner`)
//! - Centralized limits for recursive walks
//! - User-facing diagnostics (`Diagnostic`, codes and message templates)
//! - Tracing subscriber setup driven by `KILN_LOG`

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Centralized limits and thresholds
pub mod limits;

// User-facing diagnostics
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, SourceSpan};

// Tracing subscriber configuration
pub mod tracing_config;
