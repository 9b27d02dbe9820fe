//! Tests for the transaction coordinator
//!
//! These tests verify:
//! - All keys are written when every expectation holds
//! - No key is written when any expectation fails
//! - Absent keys fail the precondition
//! - Concurrent compare-and-set has a single winner

use std::sync::atomic::{AtomicUsize, Ordering};

use memberpoint::{Config, MemberPoint, MemberPointRepository, MemoryStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_repo() -> MemberPointRepository<MemoryStore> {
    MemberPointRepository::new(MemoryStore::new(), Config::default()).unwrap()
}

fn seed(repo: &MemberPointRepository<MemoryStore>, records: &[MemberPoint]) {
    for record in records {
        repo.scalar().insert(record, None).unwrap();
    }
}

fn current(repo: &MemberPointRepository<MemoryStore>, member_id: u32) -> Option<i64> {
    repo.scalar().find(member_id).unwrap().map(|r| r.point)
}

// =============================================================================
// Commit Tests
// =============================================================================

#[test]
fn test_conditional_set_commits_when_all_match() {
    let repo = setup_repo();
    let expected = [MemberPoint::new(100000, 10002), MemberPoint::new(100001, 10003)];
    seed(&repo, &expected);

    assert!(repo.transactions().conditional_set(&expected, 0).unwrap());
    assert_eq!(current(&repo, 100000), Some(0));
    assert_eq!(current(&repo, 100001), Some(0));
}

#[test]
fn test_empty_expectation_commits_trivially() {
    let repo = setup_repo();
    assert!(repo.transactions().conditional_set(&[], 5).unwrap());
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_one_mismatch_leaves_every_key_unchanged() {
    let repo = setup_repo();
    let stored = [MemberPoint::new(1, 10), MemberPoint::new(2, 20), MemberPoint::new(3, 30)];
    seed(&repo, &stored);

    let expected = [MemberPoint::new(1, 10), MemberPoint::new(2, 21), MemberPoint::new(3, 30)];
    assert!(!repo.transactions().conditional_set(&expected, 0).unwrap());

    for record in &stored {
        assert_eq!(current(&repo, record.member_id), Some(record.point));
    }
}

#[test]
fn test_absent_key_fails_precondition() {
    let repo = setup_repo();
    seed(&repo, &[MemberPoint::new(1, 10)]);

    let expected = [MemberPoint::new(1, 10), MemberPoint::new(2, 0)];
    assert!(!repo.transactions().conditional_set(&expected, 7).unwrap());
    assert_eq!(current(&repo, 1), Some(10));
    assert_eq!(current(&repo, 2), None);
}

#[test]
fn test_fault_is_error_not_rejection() {
    let store = MemoryStore::new();
    let repo = MemberPointRepository::new(store.clone(), Config::default()).unwrap();
    seed(&repo, &[MemberPoint::new(1, 10)]);
    store.fail_next(1);

    assert!(repo.transactions().conditional_set(&[MemberPoint::new(1, 10)], 0).is_err());
    assert_eq!(current(&repo, 1), Some(10));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_cas_has_single_winner() {
    let repo = setup_repo();
    let expected = [MemberPoint::new(1, 100), MemberPoint::new(2, 100)];
    seed(&repo, &expected);
    let winners = AtomicUsize::new(0);

    crossbeam::scope(|s| {
        for i in 0..8 {
            let repo = &repo;
            let winners = &winners;
            let expected = &expected;
            s.spawn(move |_| {
                if repo.transactions().conditional_set(expected, 1000 + i).unwrap() {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    })
    .unwrap();

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert_eq!(current(&repo, 1), current(&repo, 2));
}
