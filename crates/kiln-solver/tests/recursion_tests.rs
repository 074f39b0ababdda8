use super::*;

#[test]
fn profile_limits_come_from_common_limits() {
    assert_eq!(
        RecursionProfile::Unification.max_depth(),
        kiln_common::limits::MAX_UNIFY_DEPTH
    );
    assert_eq!(
        RecursionProfile::Relation.max_depth(),
        kiln_common::limits::MAX_RELATION_DEPTH
    );
    assert_eq!(
        RecursionProfile::Hierarchy.max_iterations(),
        kiln_common::limits::MAX_WALK_ITERATIONS
    );
}

#[test]
fn profile_custom_limits() {
    let p = RecursionProfile::Custom {
        max_depth: 7,
        max_iterations: 42,
    };
    assert_eq!(p.max_depth(), 7);
    assert_eq!(p.max_iterations(), 42);
}

#[test]
fn guard_detects_cycle() {
    let mut guard = RecursionGuard::<u32>::with_profile(RecursionProfile::Hierarchy);
    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(1).is_cycle());
    assert!(guard.is_visiting(&1));
    guard.leave(1);
    assert!(!guard.is_visiting(&1));
    assert_eq!(guard.depth(), 0);
}

#[test]
fn guard_depth_limit_is_sticky() {
    let mut guard = RecursionGuard::<u32>::new(2, 100);
    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(2).is_entered());
    assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
    guard.leave(2);
    guard.leave(1);
    assert!(guard.is_exceeded());
    guard.reset();
    assert!(!guard.is_exceeded());
}

#[test]
fn guard_iteration_limit() {
    let mut guard = RecursionGuard::<u32>::new(10, 2);
    assert!(guard.enter(1).is_entered());
    guard.leave(1);
    assert!(guard.enter(2).is_entered());
    guard.leave(2);
    assert_eq!(guard.enter(3), RecursionResult::IterationExceeded);
    assert_eq!(guard.iterations(), 3);
}

#[test]
fn guard_scope_leaves_on_return() {
    let mut guard = RecursionGuard::<u32>::new(10, 100);
    let value = guard.scope(5, |inner| {
        assert!(inner.enter(5).is_cycle());
        42
    });
    assert_eq!(value, Ok(42));
    assert_eq!(guard.depth(), 0);
}

#[test]
fn depth_counter_limits() {
    let mut counter = DepthCounter::new(2);
    assert!(counter.enter());
    assert!(counter.enter());
    assert!(!counter.enter());
    assert!(counter.is_exceeded());
    assert_eq!(counter.depth(), 2);
    counter.leave();
    counter.leave();
    assert_eq!(counter.depth(), 0);
}
