//! Tests for key derivation
//!
//! These tests verify:
//! - Default per-kind namespaces
//! - The shared single-namespace layout
//! - Injectivity across member ids and kinds

use std::collections::HashSet;

use memberpoint::keys::{KeySpace, StructureKind, DEFAULT_PREFIX};
use memberpoint::{Config, MemberPointRepository, MemoryStore};

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_default_keys_carry_kind_tag() {
    let keys = KeySpace::default();

    assert_eq!(keys.derive(StructureKind::Scalar, 100000).as_str(), "RedisSample:String:MemberPoint:100000");
    assert_eq!(keys.derive(StructureKind::Hash, 100000).as_str(), "RedisSample:Hash:MemberPoint:100000");
    assert_eq!(
        keys.derive(StructureKind::HyperLogLog, 7).as_str(),
        "RedisSample:HyperLogLog:MemberPoint:7"
    );
}

#[test]
fn test_shared_layout_matches_legacy_keys() {
    let keys = KeySpace::shared(DEFAULT_PREFIX);

    for kind in StructureKind::ALL {
        assert_eq!(keys.derive(kind, 100001).as_str(), "RedisSample:MemberPoint:100001");
    }
}

#[test]
fn test_namespace_override_only_touches_one_kind() {
    let keys = KeySpace::default().with_namespace(StructureKind::List, "Archive");

    assert_eq!(keys.derive(StructureKind::List, 1).as_str(), "Archive:MemberPoint:1");
    assert_eq!(keys.derive(StructureKind::Set, 1).as_str(), "RedisSample:Set:MemberPoint:1");
}

#[test]
fn test_derive_all_preserves_order() {
    let keys = KeySpace::default();
    let derived = keys.derive_all(StructureKind::Set, [3, 1, 2]);

    let names: Vec<&str> = derived.iter().map(|k| k.as_str()).collect();
    assert_eq!(
        names,
        vec!["RedisSample:Set:MemberPoint:3", "RedisSample:Set:MemberPoint:1", "RedisSample:Set:MemberPoint:2"]
    );
}

// =============================================================================
// Injectivity Tests
// =============================================================================

#[test]
fn test_distinct_ids_give_distinct_keys() {
    let keys = KeySpace::default();
    let mut seen = HashSet::new();

    for kind in StructureKind::ALL {
        for id in [0, 1, 9, 10, 11, 100, 100000, 100001, u32::MAX] {
            assert!(seen.insert(keys.derive(kind, id)), "collision for {:?} {}", kind, id);
        }
    }
}

#[test]
fn test_repository_uses_configured_keyspace() {
    let config = Config::builder().keyspace(KeySpace::new("Tenant")).build();
    let repo = MemberPointRepository::new(MemoryStore::new(), config).unwrap();

    assert_eq!(repo.key(StructureKind::SortedSet, 5).as_str(), "Tenant:SortedSet:MemberPoint:5");
}
