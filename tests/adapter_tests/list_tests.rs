//! Tests for the list adapter
//!
//! These tests verify:
//! - Push order at both ends
//! - Pops and index lookups
//! - Pivot inserts, including absent pivots and keys
//! - Removal of every occurrence
//! - Moving elements between lists

use memberpoint::{Config, MemberPoint, MemberPointRepository, MemoryStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_repo() -> MemberPointRepository<MemoryStore> {
    MemberPointRepository::new(MemoryStore::new(), Config::default()).unwrap()
}

fn mp(point: i64) -> MemberPoint {
    MemberPoint::new(100000, point)
}

// =============================================================================
// Push / Pop Tests
// =============================================================================

#[test]
fn test_push_left_reverses_order() {
    let repo = setup_repo();
    repo.list().push_left(&mp(1)).unwrap();
    repo.list().push_left(&mp(2)).unwrap();
    repo.list().push_left(&mp(3)).unwrap();

    assert_eq!(repo.list().range(100000).unwrap(), vec![mp(3), mp(2), mp(1)]);
}

#[test]
fn test_push_right_keeps_order() {
    let repo = setup_repo();
    assert_eq!(repo.list().push_right_many(&[mp(1), mp(2), mp(3)]).unwrap(), 3);

    assert_eq!(repo.list().range(100000).unwrap(), vec![mp(1), mp(2), mp(3)]);
}

#[test]
fn test_push_left_many_puts_last_first() {
    let repo = setup_repo();
    repo.list().push_left_many(&[mp(1), mp(2), mp(3)]).unwrap();

    assert_eq!(repo.list().range(100000).unwrap(), vec![mp(3), mp(2), mp(1)]);
}

#[test]
fn test_push_many_empty_is_noop() {
    let repo = setup_repo();
    assert_eq!(repo.list().push_right_many(&[]).unwrap(), 0);
    assert_eq!(repo.list().length(100000).unwrap(), 0);
}

#[test]
fn test_pops_take_from_each_end() {
    let repo = setup_repo();
    repo.list().push_right_many(&[mp(1), mp(2), mp(3)]).unwrap();

    assert_eq!(repo.list().pop_left(100000).unwrap(), Some(mp(1)));
    assert_eq!(repo.list().pop_right(100000).unwrap(), Some(mp(3)));
    assert_eq!(repo.list().length(100000).unwrap(), 1);
}

#[test]
fn test_pop_empty_is_none() {
    let repo = setup_repo();
    assert_eq!(repo.list().pop_left(100000).unwrap(), None);
    assert_eq!(repo.list().pop_right(100000).unwrap(), None);
}

#[test]
fn test_find_by_index_counts_from_either_end() {
    let repo = setup_repo();
    repo.list().push_right_many(&[mp(1), mp(2), mp(3)]).unwrap();

    assert_eq!(repo.list().find_by_index(100000, 0).unwrap(), Some(mp(1)));
    assert_eq!(repo.list().find_by_index(100000, -1).unwrap(), Some(mp(3)));
    assert_eq!(repo.list().find_by_index(100000, 3).unwrap(), None);
}

// =============================================================================
// Pivot Insert Tests
// =============================================================================

#[test]
fn test_insert_before_and_after_pivot() {
    let repo = setup_repo();
    repo.list().push_right_many(&[mp(1), mp(3)]).unwrap();

    assert_eq!(repo.list().insert_before(&mp(3), &mp(2)).unwrap(), 3);
    assert_eq!(repo.list().insert_after(&mp(3), &mp(4)).unwrap(), 4);
    assert_eq!(repo.list().range(100000).unwrap(), vec![mp(1), mp(2), mp(3), mp(4)]);
}

#[test]
fn test_insert_with_absent_pivot_returns_minus_one() {
    let repo = setup_repo();
    repo.list().push_right(&mp(1)).unwrap();

    assert_eq!(repo.list().insert_before(&mp(9), &mp(2)).unwrap(), -1);
    assert_eq!(repo.list().range(100000).unwrap(), vec![mp(1)]);
}

#[test]
fn test_insert_into_absent_list_returns_zero() {
    let repo = setup_repo();
    assert_eq!(repo.list().insert_after(&mp(1), &mp(2)).unwrap(), 0);
    assert_eq!(repo.list().length(100000).unwrap(), 0);
}

// =============================================================================
// Removal Tests
// =============================================================================

#[test]
fn test_remove_drops_every_occurrence() {
    let repo = setup_repo();
    repo.list().push_right_many(&[mp(1), mp(2), mp(1), mp(3), mp(1)]).unwrap();

    assert_eq!(repo.list().remove(&mp(1)).unwrap(), 3);
    assert_eq!(repo.list().range(100000).unwrap(), vec![mp(2), mp(3)]);
}

#[test]
fn test_remove_absent_value_removes_nothing() {
    let repo = setup_repo();
    repo.list().push_right(&mp(1)).unwrap();
    assert_eq!(repo.list().remove(&mp(5)).unwrap(), 0);
}

// =============================================================================
// Move Tests
// =============================================================================

#[test]
fn test_move_right_pop_left_push() {
    let repo = setup_repo();
    repo.list().push_right_many(&[mp(1), mp(2)]).unwrap();
    repo.list().push_right(&MemberPoint::new(100001, 9)).unwrap();

    let moved = repo.list().move_right_pop_left_push(100000, 100001).unwrap();
    assert_eq!(moved, Some(mp(2)));
    assert_eq!(repo.list().range(100000).unwrap(), vec![mp(1)]);
    assert_eq!(repo.list().range(100001).unwrap(), vec![mp(2), MemberPoint::new(100001, 9)]);
}

#[test]
fn test_move_from_empty_list_is_none() {
    let repo = setup_repo();
    assert_eq!(repo.list().move_right_pop_left_push(1, 2).unwrap(), None);
}
