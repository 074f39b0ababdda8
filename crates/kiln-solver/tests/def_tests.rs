use super::*;
use kiln_common::interner::Interner;

#[test]
fn test_def_id_validity() {
    assert!(!DefId::INVALID.is_valid());
    assert!(DefId(DefId::FIRST_VALID).is_valid());
}

#[test]
fn test_register_and_get() {
    let names = Interner::new();
    let store = DefinitionStore::new();
    assert!(store.is_empty());

    let list = store.register(Definition::composite(DefKind::Class, names.intern("List")));
    let color = store.register(Definition::enumeration(
        names.intern("Color"),
        vec![names.intern("Red"), names.intern("Green")],
    ));

    assert_ne!(list, color);
    assert!(list.is_valid());
    assert_eq!(store.len(), 2);
    assert!(store.contains(list));
    assert_eq!(store.get_kind(color), Some(DefKind::Enum));
    assert_eq!(store.get(color).map(|def| def.enum_members.len()), Some(2));
    assert!(store.get(DefId(999)).is_none());
}

#[test]
fn test_push_params_and_bases() {
    let names = Interner::new();
    let store = DefinitionStore::new();
    let id = store.register(Definition::composite(DefKind::Interface, names.intern("Sink")));
    let before = store.get(id).expect("registered");

    store.push_type_param(
        id,
        TypeParamInfo {
            var: TypeId(100),
            variance: Variance::Contravariant,
        },
    );
    store.push_base(id, TypeId(101));

    let after = store.get(id).expect("registered");
    assert_eq!(after.type_params.len(), 1);
    assert_eq!(after.param_variance(0), Variance::Contravariant);
    assert_eq!(after.bases, vec![TypeId(101)]);
    // Snapshots handed out earlier are not mutated.
    assert!(before.type_params.is_empty());
}

#[test]
fn test_reference_kinds() {
    assert!(DefKind::Class.is_reference());
    assert!(DefKind::Protocol.is_reference());
    assert!(!DefKind::Struct.is_reference());
    assert!(!DefKind::Enum.is_reference());
}
