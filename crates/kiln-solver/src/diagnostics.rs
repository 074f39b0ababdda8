//! Diagnostic generation for overload resolution failures.
//!
//! Unification failures are local values and never reach users. The only
//! solver failures that do are deferred call types still unresolved at the
//! end of analysis; this module renders those [`OverloadError`]s as
//! [`Diagnostic`]s, with one related line per candidate.

use crate::call::{CallSite, CallTable};
use crate::constraint::OverloadError;
use crate::db::TypeDatabase;
use crate::format::TypeFormatter;
use kiln_common::diagnostics::{
    Diagnostic, SourceSpan, diagnostic_codes as codes, format_message, message_template,
};

/// Builder for overload diagnostics.
pub struct DiagnosticBuilder<'a> {
    formatter: TypeFormatter<'a>,
    calls: &'a CallTable,
}

impl<'a> DiagnosticBuilder<'a> {
    pub fn new(db: &'a dyn TypeDatabase, calls: &'a CallTable) -> Self {
        DiagnosticBuilder {
            formatter: TypeFormatter::new(db),
            calls,
        }
    }

    /// Render one overload error. `span` is the location of the call.
    pub fn overload_error(&self, error: &OverloadError, span: Option<SourceSpan>) -> Diagnostic {
        let site = self.calls.get(error.call());
        let callee = site.map_or_else(
            || format!("call #{}", error.call().0),
            |site| site.name().to_string(),
        );

        let diagnostic = match error {
            OverloadError::NoMatchingOverload { .. } => {
                Diagnostic::error(codes::NO_MATCHING_OVERLOAD, &[callee])
            }
            OverloadError::Ambiguous {
                index: Some(index),
                live,
                ..
            } => Diagnostic::error(
                codes::AMBIGUOUS_PARAMETER_TYPE,
                &[callee, index.to_string(), live.to_string()],
            ),
            OverloadError::Ambiguous {
                index: None, live, ..
            } => Diagnostic::error(codes::AMBIGUOUS_CALL, &[callee, live.to_string()]),
        }
        .with_span(span);

        match site {
            Some(site) => self.with_candidates(diagnostic, site, error),
            None => diagnostic,
        }
    }

    /// Render every error, all pointing at `span`.
    pub fn overload_errors(
        &self,
        errors: &[OverloadError],
        span: Option<SourceSpan>,
    ) -> Vec<Diagnostic> {
        errors
            .iter()
            .map(|error| self.overload_error(error, span.clone()))
            .collect()
    }

    /// List the candidates: every candidate when none matched, the live
    /// ones when the call is ambiguous.
    fn with_candidates(
        &self,
        mut diagnostic: Diagnostic,
        site: &CallSite,
        error: &OverloadError,
    ) -> Diagnostic {
        let show_all = matches!(error, OverloadError::NoMatchingOverload { .. });
        for candidate in site.candidates() {
            if !show_all && candidate.is_culled() {
                continue;
            }
            let signature = self.formatter.format(candidate.function_type());
            let line = format_message(message_template(codes::CANDIDATE_IS), &[signature]);
            diagnostic = diagnostic.with_related(None, line);
        }
        diagnostic
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
