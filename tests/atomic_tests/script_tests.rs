//! Tests for the script executor
//!
//! These tests verify:
//! - add_if_not_exist creates the record once, with a TTL
//! - update_if_exist only touches existing records
//! - Concurrent callers see exactly one creator

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use memberpoint::{Config, Error, MemberPoint, MemberPointRepository, MemoryStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_repo() -> MemberPointRepository<MemoryStore> {
    MemberPointRepository::new(MemoryStore::new(), Config::default()).unwrap()
}

// =============================================================================
// add_if_not_exist Tests
// =============================================================================

#[test]
fn test_add_if_not_exist_creates_once() {
    let repo = setup_repo();

    assert!(repo.scripts().add_if_not_exist(&MemberPoint::new(100000, 10002)).unwrap());
    assert!(!repo.scripts().add_if_not_exist(&MemberPoint::new(100000, 1)).unwrap());
    assert_eq!(repo.hash().find_all(100000).unwrap(), Some(MemberPoint::new(100000, 10002)));
}

#[test]
fn test_add_if_not_exist_applies_configured_ttl() {
    let config = Config::builder().script_ttl(Duration::from_secs(1)).build();
    let repo = MemberPointRepository::new(MemoryStore::new(), config).unwrap();

    assert!(repo.scripts().add_if_not_exist(&MemberPoint::new(1, 1)).unwrap());
    thread::sleep(Duration::from_millis(1100));
    assert_eq!(repo.hash().find_all(1).unwrap(), None);
}

#[test]
fn test_zero_script_ttl_is_rejected() {
    let config = Config::builder().script_ttl(Duration::ZERO).build();
    let err = MemberPointRepository::new(MemoryStore::new(), config).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

// =============================================================================
// update_if_exist Tests
// =============================================================================

#[test]
fn test_update_if_exist_adds_delta() {
    let repo = setup_repo();
    let entity = MemberPoint::new(100001, 10003);
    repo.hash().insert(&entity).unwrap();

    assert!(repo.scripts().update_if_exist(&entity, 7).unwrap());
    assert_eq!(repo.hash().find_all(100001).unwrap(), Some(MemberPoint::new(100001, 10010)));
}

#[test]
fn test_update_if_exist_on_absent_record_writes_nothing() {
    let repo = setup_repo();

    assert!(!repo.scripts().update_if_exist(&MemberPoint::new(1, 0), 5).unwrap());
    assert_eq!(repo.hash().find_all(1).unwrap(), None);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_add_has_single_creator() {
    let repo = setup_repo();
    let created = AtomicUsize::new(0);

    crossbeam::scope(|s| {
        for i in 0..16 {
            let repo = &repo;
            let created = &created;
            s.spawn(move |_| {
                if repo.scripts().add_if_not_exist(&MemberPoint::new(42, i)).unwrap() {
                    created.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    })
    .unwrap();

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(repo.hash().find_all(42).unwrap().unwrap().member_id, 42);
}

#[test]
fn test_concurrent_updates_are_not_lost() {
    let repo = setup_repo();
    repo.hash().insert(&MemberPoint::new(7, 0)).unwrap();

    crossbeam::scope(|s| {
        for _ in 0..8 {
            let repo = &repo;
            s.spawn(move |_| {
                for _ in 0..25 {
                    repo.scripts().update_if_exist(&MemberPoint::new(7, 0), 1).unwrap();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(repo.hash().find_all(7).unwrap().unwrap().point, 200);
}
