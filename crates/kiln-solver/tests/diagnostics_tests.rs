use super::*;
use crate::call::CallCandidate;
use crate::intern::TypeInterner;
use crate::types::{CallId, TypeId};

fn max_call(interner: &TypeInterner, calls: &mut CallTable) -> CallId {
    calls.add_call(
        "max",
        vec![
            CallCandidate::new(interner.function(vec![TypeId::INT32, TypeId::INT32], TypeId::INT32)),
            CallCandidate::new(
                interner.function(vec![TypeId::FLOAT64, TypeId::FLOAT64], TypeId::FLOAT64),
            ),
            CallCandidate::new(interner.function(vec![TypeId::STRING], TypeId::STRING)),
        ],
    )
}

fn related_lines(diagnostic: &Diagnostic) -> Vec<&str> {
    diagnostic
        .related_information
        .iter()
        .map(|info| info.message_text.as_str())
        .collect()
}

#[test]
fn test_no_matching_overload_lists_every_candidate() {
    let interner = TypeInterner::new();
    let mut calls = CallTable::new();
    let call = max_call(&interner, &mut calls);
    let site = calls.get_mut(call).expect("call site");
    for index in 0..3 {
        site.cull(index);
    }

    let builder = DiagnosticBuilder::new(&interner, &calls);
    let span = SourceSpan::new("main.kn", 40, 9);
    let diagnostic = builder.overload_error(
        &OverloadError::NoMatchingOverload { call },
        Some(span.clone()),
    );

    assert_eq!(diagnostic.code, codes::NO_MATCHING_OVERLOAD);
    assert_eq!(diagnostic.message_text, "No matching method for call to max.");
    assert_eq!(diagnostic.span, Some(span));
    assert_eq!(
        related_lines(&diagnostic),
        vec![
            "Candidate: fn (int32, int32) -> int32",
            "Candidate: fn (double, double) -> double",
            "Candidate: fn (string) -> string",
        ]
    );
}

#[test]
fn test_ambiguous_lists_live_candidates() {
    let interner = TypeInterner::new();
    let mut calls = CallTable::new();
    let call = max_call(&interner, &mut calls);
    calls.get_mut(call).expect("call site").cull(2);

    let builder = DiagnosticBuilder::new(&interner, &calls);
    let diagnostic = builder.overload_error(
        &OverloadError::Ambiguous {
            call,
            index: None,
            live: 2,
        },
        None,
    );

    assert_eq!(diagnostic.code, codes::AMBIGUOUS_CALL);
    assert_eq!(
        diagnostic.message_text,
        "Ambiguous call to max: 2 candidates remain viable."
    );
    assert_eq!(diagnostic.span, None);
    assert_eq!(
        related_lines(&diagnostic),
        vec![
            "Candidate: fn (int32, int32) -> int32",
            "Candidate: fn (double, double) -> double",
        ]
    );

    let parameter = builder.overload_error(
        &OverloadError::Ambiguous {
            call,
            index: Some(1),
            live: 2,
        },
        None,
    );
    assert_eq!(parameter.code, codes::AMBIGUOUS_PARAMETER_TYPE);
    assert_eq!(
        parameter.message_text,
        "Cannot determine the type of argument 1 in call to max: 2 candidates remain viable."
    );
}

#[test]
fn test_unknown_call_falls_back_to_id() {
    let interner = TypeInterner::new();
    let calls = CallTable::new();
    let builder = DiagnosticBuilder::new(&interner, &calls);

    let diagnostic = builder.overload_error(
        &OverloadError::NoMatchingOverload { call: CallId(4) },
        None,
    );
    assert_eq!(diagnostic.message_text, "No matching method for call to call #4.");
    assert!(diagnostic.related_information.is_empty());
}

#[test]
fn test_overload_errors_share_span() {
    let interner = TypeInterner::new();
    let mut calls = CallTable::new();
    let call = max_call(&interner, &mut calls);
    let builder = DiagnosticBuilder::new(&interner, &calls);
    let span = SourceSpan::new("lib.kn", 0, 3);

    let diagnostics = builder.overload_errors(
        &[
            OverloadError::Ambiguous {
                call,
                index: Some(0),
                live: 3,
            },
            OverloadError::NoMatchingOverload { call: CallId(8) },
        ],
        Some(span.clone()),
    );

    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.span.as_ref() == Some(&span)));
    assert_eq!(related_lines(&diagnostics[0]).len(), 3);
}
