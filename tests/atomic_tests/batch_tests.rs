//! Tests for the batch executor
//!
//! These tests verify:
//! - Only present members are returned
//! - Entries that fail on their own are skipped, not fatal
//! - A pipeline fault is an error

use std::collections::BTreeMap;

use memberpoint::keys::{KeySpace, DEFAULT_PREFIX};
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
// Scalar Batch Tests
// =============================================================================

#[test]
fn test_batch_get_returns_present_only() {
    let (_store, repo) = setup_repo();
    repo.scalar().insert(&MemberPoint::new(100000, 10002), None).unwrap();
    repo.scalar().insert(&MemberPoint::new(100001, 10003), None).unwrap();

    let found = repo.batch().batch_get(&[100000, 100001, 100002]).unwrap();
    assert_eq!(found, BTreeMap::from([(100000, 10002), (100001, 10003)]));
}

#[test]
fn test_batch_get_empty_input() {
    let (_store, repo) = setup_repo();
    assert!(repo.batch().batch_get(&[]).unwrap().is_empty());
}

#[test]
fn test_batch_get_skips_wrong_type_entries() {
    // Shared layout: the list and the scalar of member 2 share one key
    let config = Config::builder().keyspace(KeySpace::shared(DEFAULT_PREFIX)).build();
    let repo = MemberPointRepository::new(MemoryStore::new(), config).unwrap();
    repo.scalar().insert(&MemberPoint::new(1, 10), None).unwrap();
    repo.list().push_right(&MemberPoint::new(2, 20)).unwrap();

    let found = repo.batch().batch_get(&[1, 2]).unwrap();
    assert_eq!(found, BTreeMap::from([(1, 10)]));
}

#[test]
fn test_batch_get_fault_is_error() {
    let (store, repo) = setup_repo();
    repo.scalar().insert(&MemberPoint::new(1, 10), None).unwrap();
    store.set_offline(true);

    let (err, found) = repo.batch().batch_get(&[1]).into_pair();
    assert!(err.unwrap().is_connection());
    assert!(found.is_empty());
}

// =============================================================================
// Hash Batch Tests
// =============================================================================

#[test]
fn test_batch_get_hash_reads_point_field() {
    let (_store, repo) = setup_repo();
    repo.hash().insert(&MemberPoint::new(1, 11)).unwrap();
    repo.hash().insert(&MemberPoint::new(2, 22)).unwrap();

    let found = repo.batch().batch_get_hash(&[1, 2, 3]).unwrap();
    assert_eq!(found, BTreeMap::from([(1, 11), (2, 22)]));
}

#[test]
fn test_batch_get_hash_ignores_scalars() {
    let (_store, repo) = setup_repo();
    repo.scalar().insert(&MemberPoint::new(1, 10), None).unwrap();

    assert!(repo.batch().batch_get_hash(&[1]).unwrap().is_empty());
}
