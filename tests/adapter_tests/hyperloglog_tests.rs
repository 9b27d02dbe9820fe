//! Tests for the HyperLogLog adapter
//!
//! These tests verify:
//! - Distinct counting, ignoring duplicates
//! - Union counts across members
//! - Merge writes only the destination

use memberpoint::{Config, MemberPoint, MemberPointRepository, MemoryStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_repo() -> MemberPointRepository<MemoryStore> {
    MemberPointRepository::new(MemoryStore::new(), Config::default()).unwrap()
}

fn observe(repo: &MemberPointRepository<MemoryStore>, member_id: u32, values: impl IntoIterator<Item = i64>) {
    let entities: Vec<MemberPoint> = values.into_iter().map(|p| MemberPoint::new(member_id, p)).collect();
    repo.hyperloglog().add_many(&entities).unwrap();
}

// =============================================================================
// Counting Tests
// =============================================================================

#[test]
fn test_add_counts_distinct_points() {
    let repo = setup_repo();
    let entity = MemberPoint::new(100000, 10002);

    assert!(repo.hyperloglog().add(&entity).unwrap());
    assert!(!repo.hyperloglog().add(&entity).unwrap());
    assert_eq!(repo.hyperloglog().length(100000).unwrap(), 1);
}

#[test]
fn test_absent_key_counts_zero() {
    let repo = setup_repo();
    assert_eq!(repo.hyperloglog().length(1).unwrap(), 0);
}

#[test]
fn test_small_cardinality_is_exact() {
    let repo = setup_repo();
    observe(&repo, 1, [1, 2, 3, 4, 5, 1, 2, 3]);

    assert_eq!(repo.hyperloglog().length(1).unwrap(), 5);
}

#[test]
fn test_large_cardinality_is_approximate() {
    let repo = setup_repo();
    observe(&repo, 1, 0..50_000);

    let estimate = repo.hyperloglog().length(1).unwrap() as f64;
    assert!((estimate - 50_000.0).abs() / 50_000.0 < 0.03, "estimate {}", estimate);
}

#[test]
fn test_length_union_counts_overlap_once() {
    let repo = setup_repo();
    observe(&repo, 1, [1, 2, 3]);
    observe(&repo, 2, [3, 4]);

    assert_eq!(repo.hyperloglog().length_union(&[1, 2]).unwrap(), 4);
    assert_eq!(repo.hyperloglog().length_union(&[]).unwrap(), 0);
}

// =============================================================================
// Merge Tests
// =============================================================================

#[test]
fn test_merge_leaves_sources_untouched() {
    let repo = setup_repo();
    observe(&repo, 1, [1, 2, 3]);
    observe(&repo, 2, [3, 4]);

    repo.hyperloglog().merge(9, &[1, 2]).unwrap();

    assert_eq!(repo.hyperloglog().length(9).unwrap(), 4);
    assert_eq!(repo.hyperloglog().length(1).unwrap(), 3);
    assert_eq!(repo.hyperloglog().length(2).unwrap(), 2);
}

#[test]
fn test_merge_keeps_existing_destination_observations() {
    let repo = setup_repo();
    observe(&repo, 9, [100]);
    observe(&repo, 1, [1]);

    repo.hyperloglog().merge(9, &[1]).unwrap();
    assert_eq!(repo.hyperloglog().length(9).unwrap(), 2);
}
