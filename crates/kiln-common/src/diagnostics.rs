//! User-facing diagnostic types, codes and message templates.
//!
//! Only terminal overload-resolution failures reach users; every other solver
//! failure stays local to the query that produced it.

use serde::Serialize;
use std::sync::Arc;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Message = 2,
}

/// A source location span.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    /// File path or name
    pub file: Arc<str>,
    /// Start position (byte offset)
    pub start: u32,
    /// Length in bytes
    pub length: u32,
}

impl SourceSpan {
    pub fn new(file: impl Into<Arc<str>>, start: u32, length: u32) -> Self {
        SourceSpan {
            file: file.into(),
            start,
            length,
        }
    }
}

/// Related information for a diagnostic (e.g. one line per candidate).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub category: DiagnosticCategory,
    pub span: Option<SourceSpan>,
    pub message_text: String,
}

/// A rendered diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub span: Option<SourceSpan>,
    pub message_text: String,
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create an error diagnostic from a code and already-rendered arguments.
    pub fn error(code: u32, args: &[String]) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            span: None,
            message_text: format_message(message_template(code), args),
            related_information: Vec::new(),
        }
    }

    /// Attach a source span to this diagnostic.
    pub fn with_span(mut self, span: Option<SourceSpan>) -> Self {
        self.span = span;
        self
    }

    /// Add a related informational line.
    pub fn with_related(mut self, span: Option<SourceSpan>, message: impl Into<String>) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            category: DiagnosticCategory::Message,
            span,
            message_text: message.into(),
        });
        self
    }
}

// =============================================================================
// Diagnostic Codes
// =============================================================================

pub mod diagnostic_codes {
    /// No live candidate remains for a call.
    pub const NO_MATCHING_OVERLOAD: u32 = 4001;
    /// More than one live candidate remains and they disagree.
    pub const AMBIGUOUS_CALL: u32 = 4002;
    /// A parameter type of an overloaded call could not be pinned down.
    pub const AMBIGUOUS_PARAMETER_TYPE: u32 = 4003;
    /// Candidate listing attached to the diagnostics above.
    pub const CANDIDATE_IS: u32 = 4100;
}

/// Get the message template for a diagnostic code.
///
/// Templates use {0}, {1}, etc. as placeholders for arguments.
pub fn message_template(code: u32) -> &'static str {
    use diagnostic_codes::*;

    match code {
        NO_MATCHING_OVERLOAD => "No matching method for call to {0}.",
        AMBIGUOUS_CALL => "Ambiguous call to {0}: {1} candidates remain viable.",
        AMBIGUOUS_PARAMETER_TYPE => {
            "Cannot determine the type of argument {1} in call to {0}: {2} candidates remain viable."
        }
        CANDIDATE_IS => "Candidate: {0}",
        _ => "Unknown diagnostic {0}",
    }
}

/// Substitute `{N}` placeholders with the given arguments.
///
/// Placeholders without a matching argument are left untouched.
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}');
        let index = close.and_then(|close| after[..close].parse::<usize>().ok());
        match (close, index) {
            (Some(close), Some(index)) if index < args.len() => {
                result.push_str(&args[index]);
                rest = &after[close + 1..];
            }
            _ => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
