use super::*;
use crate::def::DefKind;
use crate::intern::TypeInterner;
use crate::relation::SubtypeResult;

#[test]
fn test_unbound_answers_unknown() {
    let interner = TypeInterner::new();
    let t = interner.pattern_var("T", None);
    let env = BindingEnv::new();
    let value = PatternValue::new(&interner, &env, t);

    assert_eq!(value.var(), t);
    assert_eq!(value.value(), None);
    assert!(!value.is_singular());
    assert_eq!(value.is_equal(TypeId::INT32), SubtypeResult::Unknown);
    assert_eq!(value.is_subtype(TypeId::INT32), SubtypeResult::Unknown);
    assert_eq!(value.includes(TypeId::INT32), SubtypeResult::Unknown);
    assert_eq!(value.convert_from(TypeId::INT8), None);
    assert_eq!(value.is_reference_type(), None);
    assert_eq!(value.ir_shape(), None);
    assert_eq!(value.format(), "%T");
}

#[test]
fn test_bound_forwards_to_value() {
    let interner = TypeInterner::new();
    let t = interner.pattern_var("T", None);
    let mut env = BindingEnv::new();
    env.add_substitution(t, TypeId::INT32);
    let value = PatternValue::new(&interner, &env, t);

    assert_eq!(value.value(), Some(TypeId::INT32));
    assert!(value.is_singular());
    assert_eq!(value.is_equal(TypeId::INT32), SubtypeResult::True);
    assert_eq!(value.is_subtype(TypeId::STRING), SubtypeResult::False);
    assert_eq!(value.convert_from(TypeId::INT16), Some(ConversionRank::ExactConversion));
    assert_eq!(value.convert_to(TypeId::INT8), Some(ConversionRank::Truncation));
    assert_eq!(value.is_reference_type(), Some(false));
    assert_eq!(
        value.ir_shape(),
        Some(IrShape::Int {
            bits: 32,
            signed: true
        })
    );
    assert_eq!(value.format(), "int32");
}

#[test]
fn test_follows_variable_chain() {
    let interner = TypeInterner::new();
    let node = interner.declare_composite(DefKind::Class, "Node");
    let node_ty = interner.composite(node, vec![]);
    let t = interner.pattern_var("T", None);
    let u = interner.pattern_var("U", None);
    let mut env = BindingEnv::new();
    env.add_substitution(t, u);
    let value = PatternValue::new(&interner, &env, t);

    assert_eq!(value.value(), Some(u));
    assert!(!value.is_singular());

    env.add_substitution(u, node_ty);
    let value = PatternValue::new(&interner, &env, t);
    assert_eq!(value.value(), Some(node_ty));
    assert_eq!(value.is_reference_type(), Some(true));
    assert_eq!(value.format(), "Node");
}

#[test]
fn test_from_type() {
    let interner = TypeInterner::new();
    let t = interner.pattern_var("T", None);
    let env = BindingEnv::new();
    let other = BindingEnv::new();

    let node = env.pattern_value(&interner, t);
    let value = PatternValue::from_type(&interner, &env, node);
    assert_eq!(value.map(|value| value.node()), Some(node));
    assert_eq!(value.map(|value| value.var()), Some(t));

    let foreign = other.pattern_value(&interner, t);
    assert!(PatternValue::from_type(&interner, &env, foreign).is_none());
    assert!(PatternValue::from_type(&interner, &env, t).is_none());
    assert!(PatternValue::from_type(&interner, &env, TypeId::INT32).is_none());
}
