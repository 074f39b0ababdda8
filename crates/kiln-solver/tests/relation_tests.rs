use super::*;
use crate::binding::{BindingEnv, NoBindings};
use crate::def::DefKind;
use crate::intern::TypeInterner;
use crate::types::CallId;

struct Fixture {
    interner: TypeInterner,
    animal: TypeId,
    dog: TypeId,
    cat: TypeId,
    list: DefId,
    sink: DefId,
    cell: DefId,
}

/// `class Animal`, `class Dog : Animal`, `class Cat : Animal`,
/// `class List[out T]`, `interface Sink[in T]`, `struct Cell[T]`.
fn fixture() -> Fixture {
    let interner = TypeInterner::new();

    let animal_def = interner.declare_composite(DefKind::Class, "Animal");
    let animal = interner.composite(animal_def, vec![]);
    let dog_def = interner.declare_composite(DefKind::Class, "Dog");
    interner.add_base(dog_def, animal);
    let cat_def = interner.declare_composite(DefKind::Class, "Cat");
    interner.add_base(cat_def, animal);

    let list = interner.declare_composite(DefKind::Class, "List");
    interner.declare_type_param(list, "T", Variance::Covariant);
    let sink = interner.declare_composite(DefKind::Interface, "Sink");
    interner.declare_type_param(sink, "T", Variance::Contravariant);
    let cell = interner.declare_composite(DefKind::Struct, "Cell");
    interner.declare_type_param(cell, "T", Variance::Invariant);

    Fixture {
        dog: interner.composite(dog_def, vec![]),
        cat: interner.composite(cat_def, vec![]),
        interner,
        animal,
        list,
        sink,
        cell,
    }
}

#[test]
fn test_result_combinators() {
    use SubtypeResult::*;
    assert_eq!(True.and(Unknown), Unknown);
    assert_eq!(Unknown.and(False), False);
    assert_eq!(True.and(True), True);
    assert_eq!(False.or(Unknown), Unknown);
    assert_eq!(Unknown.or(True), True);
    assert_eq!(False.or(False), False);
    assert!(SubtypeResult::from_bool(true).is_true());
}

#[test]
fn test_top_and_bottom() {
    let f = fixture();
    let db = &f.interner;

    assert!(is_subtype(db, &NoBindings, TypeId::NEVER, f.dog).is_true());
    assert!(is_subtype(db, &NoBindings, f.dog, TypeId::ANY).is_true());
    assert!(is_subtype(db, &NoBindings, TypeId::ANY, f.dog).is_false());
    assert!(is_subtype(db, &NoBindings, TypeId::ERROR, TypeId::INT32).is_true());
}

#[test]
fn test_class_hierarchy() {
    let f = fixture();
    let db = &f.interner;

    assert!(is_subtype(db, &NoBindings, f.dog, f.animal).is_true());
    assert!(is_subtype(db, &NoBindings, f.animal, f.dog).is_false());
    assert!(is_subtype(db, &NoBindings, f.dog, f.cat).is_false());
    assert!(includes(db, &NoBindings, f.animal, f.cat).is_true());
}

#[test]
fn test_parameter_variance() {
    let f = fixture();
    let db = &f.interner;

    let list_dog = db.composite(f.list, vec![f.dog]);
    let list_animal = db.composite(f.list, vec![f.animal]);
    assert!(is_subtype(db, &NoBindings, list_dog, list_animal).is_true());
    assert!(is_subtype(db, &NoBindings, list_animal, list_dog).is_false());

    let sink_dog = db.composite(f.sink, vec![f.dog]);
    let sink_animal = db.composite(f.sink, vec![f.animal]);
    assert!(is_subtype(db, &NoBindings, sink_animal, sink_dog).is_true());
    assert!(is_subtype(db, &NoBindings, sink_dog, sink_animal).is_false());

    let cell_dog = db.composite(f.cell, vec![f.dog]);
    let cell_animal = db.composite(f.cell, vec![f.animal]);
    assert!(is_subtype(db, &NoBindings, cell_dog, cell_animal).is_false());
    assert!(is_subtype(db, &NoBindings, cell_animal, cell_dog).is_false());
}

#[test]
fn test_functions() {
    let f = fixture();
    let db = &f.interner;

    let takes_animal = db.function(vec![f.animal], f.dog);
    let takes_dog = db.function(vec![f.dog], f.animal);
    assert!(is_subtype(db, &NoBindings, takes_animal, takes_dog).is_true());
    assert!(is_subtype(db, &NoBindings, takes_dog, takes_animal).is_false());

    let nullary = db.function(vec![], f.dog);
    assert!(is_subtype(db, &NoBindings, nullary, takes_dog).is_false());
}

#[test]
fn test_tuples_and_invariant_wrappers() {
    let f = fixture();
    let db = &f.interner;

    let dogs = db.tuple(vec![f.dog, TypeId::INT32]);
    let animals = db.tuple(vec![f.animal, TypeId::INT32]);
    assert!(is_subtype(db, &NoBindings, dogs, animals).is_true());

    assert!(is_subtype(db, &NoBindings, db.pointer(f.dog), db.pointer(f.animal)).is_false());
    assert!(is_subtype(db, &NoBindings, db.address(f.dog), db.pointer(f.dog)).is_false());
    assert!(
        is_subtype(
            db,
            &NoBindings,
            db.native_array_of(TypeId::INT32, 4),
            db.native_array_of(TypeId::INT32, 5)
        )
        .is_false()
    );
}

#[test]
fn test_unions() {
    let f = fixture();
    let db = &f.interner;
    let dog_or_cat = db.union2(f.dog, f.cat);

    assert!(is_subtype(db, &NoBindings, f.dog, dog_or_cat).is_true());
    assert!(is_subtype(db, &NoBindings, dog_or_cat, f.animal).is_true());
    assert!(is_subtype(db, &NoBindings, dog_or_cat, f.dog).is_false());
    assert!(is_subtype(db, &NoBindings, TypeId::INT32, dog_or_cat).is_false());
}

#[test]
fn test_null() {
    let f = fixture();
    let db = &f.interner;

    assert!(is_subtype(db, &NoBindings, TypeId::NULL, f.dog).is_true());
    assert!(is_subtype(db, &NoBindings, TypeId::NULL, db.pointer(TypeId::INT8)).is_true());
    assert!(is_subtype(db, &NoBindings, TypeId::NULL, TypeId::INT32).is_false());
    let cell = db.composite(f.cell, vec![TypeId::INT32]);
    assert!(is_subtype(db, &NoBindings, TypeId::NULL, cell).is_false());
}

#[test]
fn test_equality() {
    let f = fixture();
    let db = &f.interner;

    assert!(is_equal(db, &NoBindings, f.dog, f.dog).is_true());
    assert!(is_equal(db, &NoBindings, f.dog, f.animal).is_false());
    assert!(is_equal(db, &NoBindings, TypeId::INT32, TypeId::ERROR).is_true());
}

#[test]
fn test_unbound_pattern_value_is_unknown() {
    let f = fixture();
    let db = &f.interner;
    let t = db.pattern_var("T", None);
    let mut env = BindingEnv::new();
    let proxy = env.pattern_value(db, t);

    assert!(is_subtype(db, &env, proxy, f.animal).is_unknown());
    assert!(is_equal(db, &env, proxy, f.dog).is_unknown());
    assert!(is_subtype(db, &NoBindings, proxy, f.animal).is_unknown());

    env.add_substitution(t, f.dog);
    assert!(is_subtype(db, &env, proxy, f.animal).is_true());
    assert!(is_equal(db, &env, proxy, f.dog).is_true());
    assert!(is_equal(db, &env, proxy, f.cat).is_false());
    // Another environment cannot see the binding.
    assert!(is_subtype(db, &BindingEnv::new(), proxy, f.animal).is_unknown());
}

#[test]
fn test_unknown_does_not_hide_a_false() {
    let f = fixture();
    let db = &f.interner;
    let t = db.pattern_var("T", None);
    let env = BindingEnv::new();
    let proxy = env.pattern_value(db, t);

    let source = db.tuple(vec![proxy, TypeId::INT32]);
    let target = db.tuple(vec![f.animal, TypeId::STRING]);
    assert!(is_subtype(db, &env, source, target).is_false());

    let target = db.tuple(vec![f.animal, TypeId::INT32]);
    assert!(is_subtype(db, &env, source, target).is_unknown());
}

#[test]
fn test_deferred_types_are_unknown() {
    let f = fixture();
    let db = &f.interner;
    let pending = db.result_of(CallId(0));

    assert!(is_subtype(db, &NoBindings, pending, TypeId::INT32).is_unknown());
    assert!(is_subtype(db, &NoBindings, TypeId::INT32, TypeId::UNKNOWN).is_unknown());
    assert!(is_equal(db, &NoBindings, pending, TypeId::INT32).is_unknown());
}

#[test]
fn test_pattern_variables_are_rigid() {
    let f = fixture();
    let db = &f.interner;
    let t = db.pattern_var("T", None);
    let u = db.pattern_var("U", None);

    assert!(is_subtype(db, &NoBindings, t, t).is_true());
    assert!(is_subtype(db, &NoBindings, t, u).is_false());
    assert!(is_subtype(db, &NoBindings, t, f.animal).is_false());
}

#[test]
fn test_join() {
    let f = fixture();
    let db = &f.interner;

    assert_eq!(join(db, &NoBindings, f.dog, f.animal), f.animal);
    assert_eq!(join(db, &NoBindings, TypeId::NEVER, f.dog), f.dog);
    assert_eq!(join(db, &NoBindings, f.dog, f.cat), f.animal);
    assert_eq!(
        join(db, &NoBindings, TypeId::INT32, TypeId::STRING),
        db.union2(TypeId::INT32, TypeId::STRING)
    );
}

#[test]
fn test_meet() {
    let f = fixture();
    let db = &f.interner;

    assert_eq!(meet(db, &NoBindings, f.dog, f.animal), Some(f.dog));
    assert_eq!(meet(db, &NoBindings, TypeId::ANY, f.cat), Some(f.cat));
    assert_eq!(meet(db, &NoBindings, f.dog, f.cat), None);
    assert_eq!(
        meet(db, &NoBindings, db.union2(f.dog, TypeId::INT32), f.animal),
        Some(f.dog)
    );
}
