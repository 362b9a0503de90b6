//! Context Tests
//!
//! These tests verify:
//! - Deadline derivation never extends an ancestor's deadline
//! - Cancellation propagates from parent to child, not the reverse
//! - Waiting observes cancellation and expiry

use std::thread;
use std::time::{Duration, Instant};

use relayrpc::{Context, ContextError};

// =============================================================================
// Deadline Tests
// =============================================================================

#[test]
fn test_background_has_no_deadline() {
    let ctx = Context::background();
    assert!(ctx.deadline().is_none());
    assert!(ctx.remaining().is_none());
    assert!(ctx.err().is_none());
}

#[test]
fn test_with_timeout_sets_deadline() {
    let ctx = Context::background();
    let (child, _guard) = ctx.with_timeout(Duration::from_secs(10));

    let remaining = child.remaining().unwrap();
    assert!(remaining > Duration::from_secs(9));
    assert!(remaining <= Duration::from_secs(10));
    assert!(!child.is_done());
}

#[test]
fn test_child_cannot_extend_parent_deadline() {
    let (parent, _parent_guard) = Context::background().with_timeout(Duration::from_secs(1));
    let (child, _child_guard) = parent.with_timeout(Duration::from_secs(60));

    assert_eq!(child.deadline(), parent.deadline());
}

#[test]
fn test_child_can_shorten_parent_deadline() {
    let (parent, _parent_guard) = Context::background().with_timeout(Duration::from_secs(60));
    let (child, _child_guard) = parent.with_timeout(Duration::from_secs(1));

    assert!(child.deadline().unwrap() < parent.deadline().unwrap());
}

#[test]
fn test_expired_deadline() {
    let (ctx, _guard) = Context::background().with_deadline(Instant::now());

    assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    assert_eq!(ctx.remaining(), Some(Duration::ZERO));
}

#[test]
fn test_with_cancel_inherits_deadline() {
    let (parent, _parent_guard) = Context::background().with_timeout(Duration::from_secs(5));
    let (child, _child_guard) = parent.with_cancel();

    assert_eq!(child.deadline(), parent.deadline());
}

// =============================================================================
// Cancellation Tests
// =============================================================================

#[test]
fn test_dropping_guard_cancels() {
    let (ctx, guard) = Context::background().with_cancel();
    assert!(ctx.err().is_none());

    drop(guard);
    assert_eq!(ctx.err(), Some(ContextError::Canceled));
}

#[test]
fn test_cancel_propagates_to_children() {
    let (parent, parent_guard) = Context::background().with_cancel();
    let (child, _child_guard) = parent.with_timeout(Duration::from_secs(60));

    parent_guard.cancel();
    assert_eq!(child.err(), Some(ContextError::Canceled));
}

#[test]
fn test_cancel_does_not_propagate_to_parent() {
    let parent = Context::background();
    let (child, child_guard) = parent.with_cancel();

    child_guard.cancel();
    assert!(child.is_done());
    assert!(!parent.is_done());
}

// =============================================================================
// Wait Tests
// =============================================================================

#[test]
fn test_wait_returns_on_deadline() {
    let (ctx, _guard) = Context::background().with_timeout(Duration::from_millis(20));

    let start = Instant::now();
    assert_eq!(ctx.wait(), ContextError::DeadlineExceeded);
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[test]
fn test_wait_returns_on_parent_cancel() {
    let (parent, parent_guard) = Context::background().with_cancel();
    let (child, _child_guard) = parent.with_cancel();

    let waiter = thread::spawn(move || child.wait());
    thread::sleep(Duration::from_millis(10));
    parent_guard.cancel();

    assert_eq!(waiter.join().unwrap(), ContextError::Canceled);
}

#[test]
fn test_wait_timeout_elapses_on_live_context() {
    let ctx = Context::background();
    assert_eq!(ctx.wait_timeout(Duration::from_millis(5)), None);
}

#[test]
fn test_wait_timeout_sees_earlier_deadline() {
    let (ctx, _guard) = Context::background().with_timeout(Duration::from_millis(5));
    assert_eq!(
        ctx.wait_timeout(Duration::from_secs(5)),
        Some(ContextError::DeadlineExceeded)
    );
}
