use super::*;
use crate::def::DefKind;
use crate::intern::TypeInterner;
use crate::variance::Variance;

fn vars(interner: &TypeInterner) -> (TypeId, TypeId) {
    (
        interner.pattern_var("T", None),
        interner.pattern_var("U", None),
    )
}

#[test]
fn test_new_env_is_empty() {
    let mut env = BindingEnv::new();
    assert!(env.is_empty());
    assert!(env.substitutions().is_none());
    assert_eq!(env.iter().count(), 0);

    env.add_substitution(TypeId(40), TypeId::INT32);
    assert!(!env.is_empty());
    env.reset();
    assert!(env.is_empty());
}

#[test]
fn test_envs_have_distinct_ids() {
    let a = BindingEnv::new();
    let b = BindingEnv::default();
    assert_ne!(a.id(), b.id());
    assert_ne!(a.id(), a.fork().id());
}

#[test]
fn test_newest_record_shadows() {
    let interner = TypeInterner::new();
    let (t, u) = vars(&interner);
    let mut env = BindingEnv::new();

    env.add_substitution(t, TypeId::INT32);
    env.add_substitution(u, TypeId::BOOL);
    env.add_substitution(t, TypeId::INT64);

    assert_eq!(env.get(t), Some(TypeId::INT64));
    assert_eq!(env.get(u), Some(TypeId::BOOL));
    assert_eq!(env.iter().count(), 3);

    let lefts: Vec<TypeId> = env.iter().map(Substitution::left).collect();
    assert_eq!(lefts, vec![t, u, t]);

    let newest = env.get_substitution_for(t).expect("bound");
    assert!(newest.is_exact());
    assert_eq!(newest.prev().map(|prev| prev.left()), Some(u));
}

#[test]
fn test_bounded_record_value() {
    let interner = TypeInterner::new();
    let (t, u) = vars(&interner);
    let v = interner.pattern_var("V", None);
    let mut env = BindingEnv::new();

    let record = env.add_substitution_bounded(t, TypeId::ANY, TypeId::INT16);
    assert_eq!(record.right(), Some(TypeId::INT16));
    assert!(!record.is_exact());

    let record = env.add_substitution_bounded(u, TypeId::STRING, TypeId::NEVER);
    assert_eq!(record.right(), Some(TypeId::STRING));

    let record = env.add_substitution_bounded(v, TypeId::ANY, TypeId::NEVER);
    assert_eq!(record.right(), None);
    assert_eq!(env.get(v), None);
    assert!(env.get_substitution_for(v).is_some());
}

#[test]
fn test_dereference_follows_variable_chain() {
    let interner = TypeInterner::new();
    let (t, u) = vars(&interner);
    let mut env = BindingEnv::new();

    assert_eq!(env.dereference(&interner, t), t);
    env.add_substitution(t, u);
    assert_eq!(env.dereference(&interner, t), u);
    env.add_substitution(u, TypeId::CHAR);
    assert_eq!(env.dereference(&interner, t), TypeId::CHAR);
    assert_eq!(env.dereference(&interner, TypeId::BOOL), TypeId::BOOL);

    // The proxy node for `t` dereferences the same way.
    let proxy = env.pattern_value(&interner, t);
    assert_eq!(env.dereference(&interner, proxy), TypeId::CHAR);
}

#[test]
fn test_dereference_cycle() {
    let interner = TypeInterner::new();
    let (t, u) = vars(&interner);
    let mut env = BindingEnv::new();
    env.add_substitution(t, u);
    env.add_substitution(u, t);

    assert!(matches!(
        env.try_dereference(&interner, t),
        Err(BindingError::Cycle { .. })
    ));
    assert_eq!(env.dereference(&interner, t), TypeId::ERROR);
}

#[test]
fn test_subst_replaces_bound_variables() {
    let interner = TypeInterner::new();
    let (t, u) = vars(&interner);
    let mut env = BindingEnv::new();
    env.add_substitution(t, TypeId::INT32);

    let pattern = interner.function(vec![t, u], interner.pointer(t));
    let expected = interner.function(vec![TypeId::INT32, u], interner.pointer(TypeId::INT32));
    assert_eq!(env.subst(&interner, pattern), expected);
}

#[test]
fn test_subst_of_settled_type_is_identity() {
    let interner = TypeInterner::new();
    let (t, _) = vars(&interner);
    let mut env = BindingEnv::new();
    env.add_substitution(t, TypeId::INT32);

    let settled = interner.tuple(vec![TypeId::STRING, interner.pointer(TypeId::UINT8)]);
    let before = interner.len();
    assert_eq!(env.subst(&interner, settled), settled);
    assert_eq!(interner.len(), before);
}

#[test]
fn test_subst_resolves_only_own_pattern_values() {
    let interner = TypeInterner::new();
    let (t, _) = vars(&interner);
    let mut env = BindingEnv::new();
    let other = BindingEnv::new();
    env.add_substitution(t, TypeId::FLOAT32);

    let own = env.pattern_value(&interner, t);
    let foreign = other.pattern_value(&interner, t);
    assert_eq!(env.subst(&interner, own), TypeId::FLOAT32);
    assert_eq!(env.subst(&interner, foreign), foreign);
    assert_eq!(other.subst(&interner, own), own);
}

#[test]
fn test_fork_isolation() {
    let interner = TypeInterner::new();
    let (t, u) = vars(&interner);
    let mut parent = BindingEnv::new();
    parent.add_substitution(t, TypeId::INT8);

    let mut child = parent.fork();
    assert_eq!(child.get(t), Some(TypeId::INT8));

    child.add_substitution(u, TypeId::UINT8);
    parent.add_substitution(t, TypeId::INT16);

    assert_eq!(parent.get(u), None);
    assert_eq!(child.get(t), Some(TypeId::INT8));
    assert_eq!(parent.get(t), Some(TypeId::INT16));
}

#[test]
fn test_snapshot_restore() {
    let interner = TypeInterner::new();
    let (t, u) = vars(&interner);
    let mut env = BindingEnv::new();
    env.add_substitution(t, TypeId::INT8);
    let saved = env.substitutions();

    env.add_substitution(u, TypeId::UINT8);
    env.set_substitutions(saved);
    assert_eq!(env.get(u), None);
    assert_eq!(env.get(t), Some(TypeId::INT8));
}

#[test]
fn test_display() {
    let interner = TypeInterner::new();
    let (t, u) = vars(&interner);
    let list = interner.declare_composite(DefKind::Class, "List");
    interner.declare_type_param(list, "E", Variance::Covariant);
    let mut env = BindingEnv::new();

    assert_eq!(env.display(&interner).to_string(), "{}");

    env.add_substitution(t, TypeId::INT32);
    env.add_substitution_bounded(u, interner.composite(list, vec![TypeId::CHAR]), TypeId::NEVER);
    env.add_substitution(t, TypeId::BOOL);
    assert_eq!(
        env.display(&interner).to_string(),
        "{T = bool, U = List[char]}"
    );

    let mut env = BindingEnv::new();
    env.add_substitution_bounded(u, TypeId::ANY, TypeId::NEVER);
    env.add_substitution_bounded(t, TypeId::STRING, TypeId::NULL);
    assert_eq!(
        env.display(&interner).to_string(),
        "{T = null <: string, U = ?}"
    );
}

#[test]
fn test_snapshot_serializes() {
    let interner = TypeInterner::new();
    let (t, _) = vars(&interner);
    let mut env = BindingEnv::new();
    env.add_substitution_bounded(t, TypeId::ANY, TypeId::INT32);

    let snapshot = env.snapshot(&interner);
    assert_eq!(snapshot.env, env.id().0);
    assert_eq!(
        snapshot.bindings,
        vec![BindingEntry {
            var: "T".into(),
            value: Some("int32".into()),
            upper_bound: "any".into(),
            lower_bound: "int32".into(),
        }]
    );

    let json = serde_json::to_value(&snapshot).expect("serializable");
    assert_eq!(json["bindings"][0]["var"], "T");
    assert_eq!(json["bindings"][0]["upper_bound"], "any");
}

#[test]
fn test_lookups() {
    let interner = TypeInterner::new();
    let (t, u) = vars(&interner);
    let mut first = BindingEnv::new();
    let mut second = BindingEnv::new();
    first.add_substitution(t, u);
    first.add_substitution(u, TypeId::INT32);
    second.add_substitution(t, TypeId::STRING);

    assert_eq!(
        first.resolve_pattern_value(&interner, first.id(), t),
        Some(TypeId::INT32)
    );
    assert_eq!(first.resolve_pattern_value(&interner, second.id(), t), None);
    assert_eq!(NoBindings.resolve_pattern_value(&interner, first.id(), t), None);

    let mut stack = EnvStack::new();
    stack.push(&first);
    stack.push(&second);
    assert_eq!(
        stack.resolve_pattern_value(&interner, second.id(), t),
        Some(TypeId::STRING)
    );
    assert_eq!(
        stack.resolve_pattern_value(&interner, BindingEnv::new().id(), t),
        None
    );
}
