//! Tests for the scalar adapter
//!
//! These tests verify:
//! - Insert / find round trip
//! - Increment and decrement results
//! - Multi-get and pipelined batch reads
//! - TTL expiry, including zero and sub-millisecond TTLs
//! - Fault reporting

use std::thread;
use std::time::Duration;

use memberpoint::{Config, IntoPair, MemberPoint, MemberPointRepository, MemoryStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_repo() -> (MemoryStore, MemberPointRepository<MemoryStore>) {
    let store = MemoryStore::new();
    let repo = MemberPointRepository::new(store.clone(), Config::default()).unwrap();
    (store, repo)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_insert_then_find() {
    let (_store, repo) = setup_repo();
    let entity = MemberPoint::new(100000, 10002);

    assert!(repo.scalar().insert(&entity, None).unwrap());
    assert_eq!(repo.scalar().find(100000).unwrap(), Some(entity));
}

#[test]
fn test_find_absent_is_none() {
    let (_store, repo) = setup_repo();
    assert_eq!(repo.scalar().find(42).unwrap(), None);
}

#[test]
fn test_update_replaces_value() {
    let (_store, repo) = setup_repo();
    repo.scalar().insert(&MemberPoint::new(1, 10), None).unwrap();
    repo.scalar().update(&MemberPoint::new(1, 99), None).unwrap();

    assert_eq!(repo.scalar().find(1).unwrap(), Some(MemberPoint::new(1, 99)));
}

#[test]
fn test_increment_and_decrement_return_new_value() {
    let (_store, repo) = setup_repo();
    repo.scalar().insert(&MemberPoint::new(100000, 10002), None).unwrap();

    assert_eq!(repo.scalar().increment(100000, 5).unwrap(), 10007);
    assert_eq!(repo.scalar().decrement(100000, 10).unwrap(), 9997);
    assert_eq!(repo.scalar().find(100000).unwrap().unwrap().point, 9997);
}

#[test]
fn test_increment_absent_starts_from_zero() {
    let (_store, repo) = setup_repo();
    assert_eq!(repo.scalar().increment(3, 4).unwrap(), 4);
}

// =============================================================================
// Multi-Key Tests
// =============================================================================

#[test]
fn test_find_many_skips_absent_and_keeps_order() {
    let (_store, repo) = setup_repo();
    repo.scalar().insert(&MemberPoint::new(100000, 10002), None).unwrap();
    repo.scalar().insert(&MemberPoint::new(100001, 10003), None).unwrap();

    let found = repo.scalar().find_many(&[100001, 5, 100000]).unwrap();
    assert_eq!(found, vec![MemberPoint::new(100001, 10003), MemberPoint::new(100000, 10002)]);
}

#[test]
fn test_batch_find_returns_present_members() {
    let (_store, repo) = setup_repo();
    repo.scalar().insert(&MemberPoint::new(2, 20), None).unwrap();
    repo.scalar().insert(&MemberPoint::new(1, 10), None).unwrap();

    let found = repo.scalar().batch_find(&[2, 1, 3]).unwrap();
    assert_eq!(found, vec![MemberPoint::new(1, 10), MemberPoint::new(2, 20)]);
}

// =============================================================================
// Expiry Tests
// =============================================================================

#[test]
fn test_ttl_expires_value() {
    let (_store, repo) = setup_repo();
    repo.scalar()
        .insert(&MemberPoint::new(100000, 1), Some(Duration::from_millis(30)))
        .unwrap();
    assert!(repo.scalar().find(100000).unwrap().is_some());

    thread::sleep(Duration::from_millis(60));
    assert_eq!(repo.scalar().find(100000).unwrap(), None);
}

#[test]
fn test_insert_without_ttl_clears_expiry() {
    let (_store, repo) = setup_repo();
    let entity = MemberPoint::new(1, 1);
    repo.scalar().insert(&entity, Some(Duration::from_millis(30))).unwrap();
    repo.scalar().insert(&entity, None).unwrap();

    thread::sleep(Duration::from_millis(60));
    assert_eq!(repo.scalar().find(1).unwrap(), Some(entity));
}

#[test]
fn test_zero_ttl_is_rejected_without_writing() {
    let (_store, repo) = setup_repo();

    let err = repo.scalar().insert(&MemberPoint::new(1, 5), Some(Duration::ZERO)).unwrap_err();
    assert!(matches!(err, memberpoint::Error::Server(_)));
    assert_eq!(repo.scalar().find(1).unwrap(), None);
}

#[test]
fn test_sub_millisecond_ttl_rounds_up() {
    let (_store, repo) = setup_repo();

    assert!(repo.scalar().update(&MemberPoint::new(1, 5), Some(Duration::from_micros(10))).unwrap());
    thread::sleep(Duration::from_millis(20));
    assert_eq!(repo.scalar().find(1).unwrap(), None);
}

// =============================================================================
// Fault Tests
// =============================================================================

#[test]
fn test_offline_store_reports_error_and_sentinel() {
    let (store, repo) = setup_repo();
    store.set_offline(true);

    let (err, value) = repo.scalar().insert(&MemberPoint::new(1, 1), None).into_pair();
    assert!(err.unwrap().is_connection());
    assert!(!value);

    let (err, value) = repo.scalar().increment(1, 1).into_pair();
    assert!(err.is_some());
    assert_eq!(value, -1);

    store.set_offline(false);
    assert_eq!(repo.scalar().find(1).unwrap(), None);
}

#[test]
fn test_single_injected_fault_affects_one_call() {
    let (store, repo) = setup_repo();
    store.fail_next(1);

    assert!(repo.scalar().insert(&MemberPoint::new(1, 1), None).is_err());
    assert!(repo.scalar().insert(&MemberPoint::new(1, 1), None).unwrap());
}
