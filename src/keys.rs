//! Key derivation
//!
//! Every structure kind owns one namespace segment, and keys follow a single
//! schema:
//!
//! - `{namespace}:MemberPoint:{member_id}`
//!
//! Default namespaces are `RedisSample:String`, `RedisSample:Hash`,
//! `RedisSample:List`, `RedisSample:Set`, `RedisSample:SortedSet` and
//! `RedisSample:HyperLogLog`. [`KeySpace::shared`] maps every kind onto one
//! namespace, the layout of deployments that separate structures by database
//! index instead.

use std::fmt;

/// Application prefix for all keys
pub const DEFAULT_PREFIX: &str = "RedisSample";

/// Entity segment of every key
pub const ENTITY_SEGMENT: &str = "MemberPoint";

/// The six store structures an entity maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructureKind {
    Scalar,
    Hash,
    List,
    Set,
    SortedSet,
    HyperLogLog,
}

impl StructureKind {
    pub const ALL: [StructureKind; 6] = [
        StructureKind::Scalar,
        StructureKind::Hash,
        StructureKind::List,
        StructureKind::Set,
        StructureKind::SortedSet,
        StructureKind::HyperLogLog,
    ];

    /// Namespace discriminator used by the default keyspace
    pub fn tag(self) -> &'static str {
        match self {
            StructureKind::Scalar => "String",
            StructureKind::Hash => "Hash",
            StructureKind::List => "List",
            StructureKind::Set => "Set",
            StructureKind::SortedSet => "SortedSet",
            StructureKind::HyperLogLog => "HyperLogLog",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A derived store key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey(String);

impl StoreKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StoreKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Namespace assignment for every structure kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    namespaces: [String; 6],
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl KeySpace {
    /// One namespace per kind: `{prefix}:{tag}`
    pub fn new(prefix: &str) -> Self {
        Self {
            namespaces: StructureKind::ALL.map(|kind| format!("{}:{}", prefix, kind.tag())),
        }
    }

    /// Same namespace for every kind
    ///
    /// Keys for different kinds collide, so the kinds must live in different
    /// databases.
    pub fn shared(namespace: &str) -> Self {
        Self {
            namespaces: StructureKind::ALL.map(|_| namespace.to_string()),
        }
    }

    /// Override the namespace of one kind
    pub fn with_namespace(mut self, kind: StructureKind, namespace: impl Into<String>) -> Self {
        self.namespaces[kind.index()] = namespace.into();
        self
    }

    pub fn namespace(&self, kind: StructureKind) -> &str {
        &self.namespaces[kind.index()]
    }

    /// Derive the key for one member
    ///
    /// Schema: `{namespace}:MemberPoint:{member_id}`
    #[inline]
    pub fn derive(&self, kind: StructureKind, member_id: u32) -> StoreKey {
        StoreKey(format!("{}:{}:{}", self.namespace(kind), ENTITY_SEGMENT, member_id))
    }

    /// Derive keys for many members, preserving order
    pub fn derive_all<I>(&self, kind: StructureKind, member_ids: I) -> Vec<StoreKey>
    where
        I: IntoIterator<Item = u32>,
    {
        member_ids.into_iter().map(|id| self.derive(kind, id)).collect()
    }
}
