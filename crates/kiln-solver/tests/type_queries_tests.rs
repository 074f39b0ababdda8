use super::*;
use crate::binding::BindingEnv;
use crate::def::DefKind;
use crate::intern::TypeInterner;
use crate::types::CallId;

#[test]
fn test_singular() {
    let interner = TypeInterner::new();
    let t = interner.pattern_var("T", None);
    let env = BindingEnv::new();

    assert!(is_singular(&interner, TypeId::INT32));
    assert!(is_singular(&interner, interner.tuple(vec![TypeId::BOOL, TypeId::STRING])));
    assert!(!is_singular(&interner, interner.pointer(t)));
    assert!(!is_singular(&interner, env.pattern_value(&interner, t)));
    assert!(!is_singular(&interner, interner.result_of(CallId(0))));
    assert!(!is_singular(&interner, TypeId::ERROR));
    assert!(!is_singular(&interner, interner.tuple(vec![TypeId::UNKNOWN])));
}

#[test]
fn test_variable_queries() {
    let interner = TypeInterner::new();
    let t = interner.pattern_var("T", None);
    let env = BindingEnv::new();
    let proxy = env.pattern_value(&interner, t);

    assert!(contains_pattern_vars(&interner, interner.pointer(t)));
    assert!(!contains_pattern_vars(&interner, interner.pointer(proxy)));
    assert!(contains_variables(&interner, interner.pointer(proxy)));
    assert!(contains_deferred(&interner, interner.pointer(interner.parameter_of(CallId(1), 0))));
    assert!(contains_error(&interner, interner.tuple(vec![TypeId::ERROR])));
}

#[test]
fn test_reference_types() {
    let interner = TypeInterner::new();
    let node = interner.declare_composite(DefKind::Class, "Node");
    let point = interner.declare_composite(DefKind::Struct, "Point");
    let node_ty = interner.composite(node, vec![]);

    assert!(is_reference_type(&interner, node_ty));
    assert!(is_reference_type(&interner, TypeId::NULL));
    assert!(is_reference_type(&interner, interner.union2(node_ty, TypeId::NULL)));
    assert!(!is_reference_type(&interner, interner.composite(point, vec![])));
    assert!(!is_reference_type(&interner, interner.union2(node_ty, TypeId::INT32)));
    assert!(!is_reference_type(&interner, interner.pointer(node_ty)));
}

#[test]
fn test_accessors() {
    let interner = TypeInterner::new();

    assert_eq!(intrinsic_kind(&interner, TypeId::CHAR), Some(IntrinsicKind::Char));
    assert_eq!(intrinsic_kind(&interner, interner.pointer(TypeId::CHAR)), None);
    assert_eq!(constant_int(&interner, interner.constant_int(12)), Some(12));

    let f = interner.function(vec![TypeId::INT8, TypeId::BOOL], TypeId::VOID);
    assert_eq!(
        function_signature(&interner, f),
        Some((vec![TypeId::INT8, TypeId::BOOL], TypeId::VOID))
    );
    assert_eq!(function_signature(&interner, TypeId::VOID), None);
}
