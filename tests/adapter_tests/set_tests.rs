//! Tests for the set adapter
//!
//! These tests verify:
//! - Membership writes and reads
//! - Union / intersection / difference, with and without a destination
//! - Random access and pops
//! - Scans over every page

use std::collections::BTreeSet;

use memberpoint::{Config, MemberPoint, MemberPointRepository, MemoryStore, SetOp};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_repo() -> MemberPointRepository<MemoryStore> {
    MemberPointRepository::new(MemoryStore::new(), Config::default()).unwrap()
}

fn points(records: &[MemberPoint]) -> BTreeSet<i64> {
    records.iter().map(|r| r.point).collect()
}

fn seed(repo: &MemberPointRepository<MemoryStore>, member_id: u32, values: &[i64]) {
    let entities: Vec<MemberPoint> = values.iter().map(|&p| MemberPoint::new(member_id, p)).collect();
    repo.set().add_many(&entities).unwrap();
}

// =============================================================================
// Membership Tests
// =============================================================================

#[test]
fn test_add_reports_new_members_only() {
    let repo = setup_repo();
    let entity = MemberPoint::new(100000, 10002);

    assert!(repo.set().add(&entity).unwrap());
    assert!(!repo.set().add(&entity).unwrap());
    assert!(repo.set().contains(&entity).unwrap());
    assert_eq!(repo.set().members(100000).unwrap(), vec![entity]);
}

#[test]
fn test_add_many_counts_new_members() {
    let repo = setup_repo();
    seed(&repo, 1, &[1, 2]);

    let batch = [MemberPoint::new(1, 2), MemberPoint::new(1, 3), MemberPoint::new(1, 4)];
    assert_eq!(repo.set().add_many(&batch).unwrap(), 2);
    assert_eq!(points(&repo.set().members(1).unwrap()), BTreeSet::from([1, 2, 3, 4]));
}

#[test]
fn test_remove_and_remove_many() {
    let repo = setup_repo();
    seed(&repo, 1, &[1, 2, 3, 4]);

    assert!(repo.set().remove(&MemberPoint::new(1, 1)).unwrap());
    assert!(!repo.set().remove(&MemberPoint::new(1, 1)).unwrap());
    assert_eq!(repo.set().remove_many(&[MemberPoint::new(1, 2), MemberPoint::new(1, 9)]).unwrap(), 1);
    assert_eq!(points(&repo.set().members(1).unwrap()), BTreeSet::from([3, 4]));
}

#[test]
fn test_move_member_between_sets() {
    let repo = setup_repo();
    seed(&repo, 1, &[10, 20]);

    assert!(repo.set().move_member(1, 2, 10).unwrap());
    assert!(!repo.set().move_member(1, 2, 99).unwrap());
    assert_eq!(points(&repo.set().members(1).unwrap()), BTreeSet::from([20]));
    assert_eq!(repo.set().members(2).unwrap(), vec![MemberPoint::new(2, 10)]);
}

// =============================================================================
// Combination Tests
// =============================================================================

#[test]
fn test_combine_ops() {
    let repo = setup_repo();
    seed(&repo, 1, &[1, 2, 3]);
    seed(&repo, 2, &[2, 3, 4]);

    let union = repo.set().combine(SetOp::Union, &[1, 2]).unwrap();
    let inter = repo.set().combine(SetOp::Intersect, &[1, 2]).unwrap();
    let diff = repo.set().combine(SetOp::Difference, &[1, 2]).unwrap();

    assert_eq!(points(&union), BTreeSet::from([1, 2, 3, 4]));
    assert_eq!(points(&inter), BTreeSet::from([2, 3]));
    assert_eq!(points(&diff), BTreeSet::from([1]));
    assert!(union.iter().all(|r| r.member_id == 0));
}

#[test]
fn test_union_is_never_smaller_than_intersection() {
    let repo = setup_repo();
    seed(&repo, 1, &[5, 6, 7, 8]);
    seed(&repo, 2, &[7, 8, 9]);
    seed(&repo, 3, &[8, 100]);

    let ids = [1, 2, 3];
    let union = repo.set().combine(SetOp::Union, &ids).unwrap();
    let inter = repo.set().combine(SetOp::Intersect, &ids).unwrap();
    assert!(union.len() >= inter.len());
    assert!(points(&inter).is_subset(&points(&union)));
}

#[test]
fn test_combine_and_store_writes_destination_only() {
    let repo = setup_repo();
    seed(&repo, 1, &[1, 2]);
    seed(&repo, 2, &[2, 3]);

    assert_eq!(repo.set().combine_and_store(SetOp::Union, 9, &[1, 2]).unwrap(), 3);
    assert_eq!(points(&repo.set().members(9).unwrap()), BTreeSet::from([1, 2, 3]));
    assert_eq!(points(&repo.set().members(1).unwrap()), BTreeSet::from([1, 2]));
}

#[test]
fn test_combine_and_store_into_first_overwrites_first() {
    let repo = setup_repo();
    seed(&repo, 1, &[1, 2]);
    seed(&repo, 2, &[2, 3]);

    assert_eq!(repo.set().combine_and_store_into_first(SetOp::Intersect, &[1, 2]).unwrap(), 1);
    assert_eq!(points(&repo.set().members(1).unwrap()), BTreeSet::from([2]));
}

#[test]
fn test_combine_and_store_requires_sources() {
    let repo = setup_repo();
    assert!(repo.set().combine_and_store(SetOp::Union, 9, &[]).is_err());
    assert!(repo.set().combine(SetOp::Union, &[]).unwrap().is_empty());
}

// =============================================================================
// Random Access Tests
// =============================================================================

#[test]
fn test_pop_removes_returned_member() {
    let repo = setup_repo();
    seed(&repo, 1, &[1, 2, 3]);

    let popped = repo.set().pop(1).unwrap().unwrap();
    assert!(!repo.set().contains(&popped).unwrap());
    assert_eq!(repo.set().members(1).unwrap().len(), 2);

    let rest = repo.set().pop_many(1, 5).unwrap();
    assert_eq!(rest.len(), 2);
    assert_eq!(repo.set().pop(1).unwrap(), None);
}

#[test]
fn test_random_members_leave_set_untouched() {
    let repo = setup_repo();
    seed(&repo, 1, &[1, 2, 3]);

    let one = repo.set().random_member(1).unwrap().unwrap();
    assert!(repo.set().contains(&one).unwrap());

    let distinct = repo.set().random_members(1, 10).unwrap();
    assert_eq!(points(&distinct), BTreeSet::from([1, 2, 3]));

    let repeated = repo.set().random_members(1, -7).unwrap();
    assert_eq!(repeated.len(), 7);
    assert_eq!(repo.set().members(1).unwrap().len(), 3);
}

#[test]
fn test_random_member_of_absent_set_is_none() {
    let repo = setup_repo();
    assert_eq!(repo.set().random_member(1).unwrap(), None);
    assert!(repo.set().random_members(1, 3).unwrap().is_empty());
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_returns_every_match_across_pages() {
    let repo = setup_repo();
    let values: Vec<i64> = (0..40).map(|i| 1000 + i).chain([2000, 3000]).collect();
    seed(&repo, 1, &values);

    // Prefix "10" matches 1000..=1039
    let found = repo.set().scan(&MemberPoint::new(1, 10), 3, 0).unwrap();
    assert_eq!(found.len(), 40);
    assert!(found.iter().all(|r| r.member_id == 1 && (1000..1040).contains(&r.point)));
}

#[test]
fn test_scan_skips_page_offset_matches() {
    let repo = setup_repo();
    seed(&repo, 1, &[11, 12, 13, 14, 25]);

    assert_eq!(repo.set().scan(&MemberPoint::new(1, 1), 0, 1).unwrap().len(), 3);
    assert_eq!(repo.set().scan(&MemberPoint::new(1, 1), 2, 10).unwrap().len(), 0);
}

#[test]
fn test_scan_pattern_glob() {
    let repo = setup_repo();
    seed(&repo, 1, &[101, 111, 121, 200]);

    let found = repo.set().scan_pattern(1, "1?1", 10, 0).unwrap();
    assert_eq!(points(&found), BTreeSet::from([101, 111, 121]));
}
