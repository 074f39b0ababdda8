use super::*;
use crate::def::DefKind;
use crate::intern::TypeInterner;
use crate::variance::Variance;

#[test]
fn test_substitution_basic() {
    let interner = TypeInterner::new();
    let t = interner.pattern_var("T", None);
    let u = interner.pattern_var("U", None);

    let mut subst = TypeSubstitution::new();
    assert!(subst.is_empty());

    subst.insert(t, TypeId::STRING);
    assert_eq!(subst.get(t), Some(TypeId::STRING));
    assert_eq!(subst.get(u), None);
    assert_eq!(subst.len(), 1);
}

#[test]
fn test_substitution_from_args() {
    let interner = TypeInterner::new();
    let pair = interner.declare_composite(DefKind::Struct, "Pair");
    let a = interner.declare_type_param(pair, "A", Variance::Invariant);
    let b = interner.declare_type_param(pair, "B", Variance::Invariant);
    let definition = interner.definition(pair).expect("declared");

    let subst = TypeSubstitution::from_args(&definition, &[TypeId::INT32, TypeId::STRING]);

    assert_eq!(subst.get(a), Some(TypeId::INT32));
    assert_eq!(subst.get(b), Some(TypeId::STRING));
}

#[test]
fn test_instantiate_pattern_var() {
    let interner = TypeInterner::new();
    let t = interner.pattern_var("T", None);

    assert_eq!(instantiate_type(&interner, t, &TypeSubstitution::new()), t);

    let mut subst = TypeSubstitution::new();
    subst.insert(t, TypeId::STRING);
    assert_eq!(instantiate_type(&interner, t, &subst), TypeId::STRING);
}

#[test]
fn test_instantiate_nested() {
    let interner = TypeInterner::new();
    let list = interner.declare_composite(DefKind::Class, "List");
    let t = interner.declare_type_param(list, "T", Variance::Covariant);
    let list_t = interner.self_type(list);
    let func = interner.function(vec![list_t], interner.pointer(t));

    let mut subst = TypeSubstitution::new();
    subst.insert(t, TypeId::INT32);
    let result = instantiate_type(&interner, func, &subst);

    let expected = interner.function(
        vec![interner.composite(list, vec![TypeId::INT32])],
        interner.pointer(TypeId::INT32),
    );
    assert_eq!(result, expected);
}

#[test]
fn test_instantiate_concrete_type_is_identity() {
    let interner = TypeInterner::new();
    let t = interner.pattern_var("T", None);
    let concrete = interner.tuple(vec![TypeId::INT32, TypeId::BOOL]);
    let mut subst = TypeSubstitution::new();
    subst.insert(t, TypeId::STRING);

    let before = interner.len();
    assert_eq!(instantiate_type(&interner, concrete, &subst), concrete);
    assert_eq!(interner.len(), before);
}

#[test]
fn test_instantiation_depth_constant() {
    assert_eq!(MAX_INSTANTIATION_DEPTH, kiln_common::limits::MAX_SUBST_DEPTH);
}
