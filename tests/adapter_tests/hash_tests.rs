//! Tests for the hash adapter
//!
//! These tests verify:
//! - Both fields are written and read back
//! - Missing fields read as zero
//! - Field increments
//! - Pipelined batch reads

use bytes::Bytes;
use memberpoint::keys::StructureKind;
use memberpoint::protocol::Command;
use memberpoint::{Config, Connection, MemberPoint, MemberPointRepository, MemoryStore, Store};

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
fn test_insert_then_find_all() {
    let (_store, repo) = setup_repo();
    let entity = MemberPoint::new(100001, 10003);

    assert!(repo.hash().insert(&entity).unwrap());
    assert_eq!(repo.hash().find_all(100001).unwrap(), Some(entity));
}

#[test]
fn test_find_all_absent_is_none() {
    let (_store, repo) = setup_repo();
    assert_eq!(repo.hash().find_all(9).unwrap(), None);
}

#[test]
fn test_find_field_reads_point() {
    let (_store, repo) = setup_repo();
    repo.hash().insert(&MemberPoint::new(7, 70)).unwrap();

    assert_eq!(repo.hash().find_field(7).unwrap(), Some(MemberPoint::new(7, 70)));
    assert_eq!(repo.hash().find_field(8).unwrap(), None);
}

#[test]
fn test_missing_field_reads_as_zero() {
    let (store, repo) = setup_repo();
    let key = repo.key(StructureKind::Hash, 5);

    // Record written by another client with only the Point field
    let mut conn = store.connect(0).unwrap();
    conn.execute(Command::HSet { key, fields: vec![("Point".to_string(), Bytes::from("12"))] })
        .unwrap();

    assert_eq!(repo.hash().find_all(5).unwrap(), Some(MemberPoint::new(0, 12)));
}

#[test]
fn test_update_overwrites_point() {
    let (_store, repo) = setup_repo();
    repo.hash().insert(&MemberPoint::new(1, 1)).unwrap();
    repo.hash().update(&MemberPoint::new(1, 50)).unwrap();

    assert_eq!(repo.hash().find_all(1).unwrap(), Some(MemberPoint::new(1, 50)));
}

// =============================================================================
// Increment Tests
// =============================================================================

#[test]
fn test_increment_and_decrement_field() {
    let (_store, repo) = setup_repo();
    repo.hash().insert(&MemberPoint::new(100001, 10003)).unwrap();

    assert_eq!(repo.hash().increment_field(100001, 7).unwrap(), 10010);
    assert_eq!(repo.hash().decrement_field(100001, 10).unwrap(), 10000);
    assert_eq!(repo.hash().find_all(100001).unwrap(), Some(MemberPoint::new(100001, 10000)));
}

#[test]
fn test_increment_field_on_absent_key_creates_point_only() {
    let (_store, repo) = setup_repo();

    assert_eq!(repo.hash().increment_field(4, 3).unwrap(), 3);
    assert_eq!(repo.hash().find_all(4).unwrap(), Some(MemberPoint::new(0, 3)));
}

// =============================================================================
// Batch Tests
// =============================================================================

#[test]
fn test_batch_find_returns_present_members() {
    let (_store, repo) = setup_repo();
    repo.hash().insert(&MemberPoint::new(1, 10)).unwrap();
    repo.hash().insert(&MemberPoint::new(3, 30)).unwrap();

    let found = repo.hash().batch_find(&[3, 2, 1]).unwrap();
    assert_eq!(found, vec![MemberPoint::new(1, 10), MemberPoint::new(3, 30)]);
}
