use super::*;
use crate::def::DefKind;
use crate::intern::TypeInterner;
use crate::variance::Variance;

/// `interface Iterable[T]`, `class Collection[T] : Iterable[T]`,
/// `class List[T] : Collection[T]`.
struct Fixture {
    interner: TypeInterner,
    iterable: DefId,
    collection: DefId,
    list: DefId,
}

fn fixture() -> Fixture {
    let interner = TypeInterner::new();

    let iterable = interner.declare_composite(DefKind::Interface, "Iterable");
    interner.declare_type_param(iterable, "T", Variance::Covariant);

    let collection = interner.declare_composite(DefKind::Class, "Collection");
    let ct = interner.declare_type_param(collection, "T", Variance::Covariant);
    interner.add_base(collection, interner.composite(iterable, vec![ct]));

    let list = interner.declare_composite(DefKind::Class, "List");
    let lt = interner.declare_type_param(list, "T", Variance::Covariant);
    interner.add_base(list, interner.composite(collection, vec![lt]));

    Fixture {
        interner,
        iterable,
        collection,
        list,
    }
}

#[test]
fn test_direct_bases_are_instantiated() {
    let f = fixture();
    let list_int = f.interner.composite(f.list, vec![TypeId::INT32]);

    assert_eq!(
        direct_bases(&f.interner, list_int),
        vec![f.interner.composite(f.collection, vec![TypeId::INT32])]
    );
    assert!(direct_bases(&f.interner, TypeId::INT32).is_empty());
}

#[test]
fn test_ancestors_nearest_first() {
    let f = fixture();
    let list_str = f.interner.composite(f.list, vec![TypeId::STRING]);

    assert_eq!(
        ancestors(&f.interner, list_str),
        vec![
            list_str,
            f.interner.composite(f.collection, vec![TypeId::STRING]),
            f.interner.composite(f.iterable, vec![TypeId::STRING]),
        ]
    );
}

#[test]
fn test_upcast() {
    let f = fixture();
    let list_int = f.interner.composite(f.list, vec![TypeId::INT32]);

    assert_eq!(
        upcast(&f.interner, list_int, f.iterable),
        Some(f.interner.composite(f.iterable, vec![TypeId::INT32]))
    );
    assert_eq!(upcast(&f.interner, list_int, f.list), Some(list_int));

    let iterable_int = f.interner.composite(f.iterable, vec![TypeId::INT32]);
    assert_eq!(upcast(&f.interner, iterable_int, f.list), None);
}

#[test]
fn test_is_derived_from() {
    let f = fixture();
    assert!(is_derived_from(&f.interner, f.list, f.iterable));
    assert!(is_derived_from(&f.interner, f.list, f.list));
    assert!(!is_derived_from(&f.interner, f.iterable, f.list));
}

#[test]
fn test_cyclic_hierarchy_terminates() {
    let interner = TypeInterner::new();
    let a = interner.declare_composite(DefKind::Class, "A");
    let b = interner.declare_composite(DefKind::Class, "B");
    let c = interner.declare_composite(DefKind::Class, "C");
    interner.add_base(a, interner.composite(b, vec![]));
    interner.add_base(b, interner.composite(a, vec![]));

    let a_ty = interner.composite(a, vec![]);
    assert_eq!(ancestors(&interner, a_ty).len(), 2);
    assert!(!is_derived_from(&interner, a, c));
    assert_eq!(upcast(&interner, a_ty, c), None);
}
