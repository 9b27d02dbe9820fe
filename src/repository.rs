//! MemberPoint Repository
//!
//! Public entry point. Holds the store and config; every accessor hands out
//! a short-lived adapter that borrows both.
//!
//! ```text
//! let repo = MemberPointRepository::new(MemoryStore::new(), Config::default())?;
//! repo.scalar().insert(&MemberPoint::new(100000, 10002), None)?;
//! repo.sorted_set().range_by_rank(100000, 0, -1)?;
//! ```

use std::time::Duration;

use tracing::info;

use crate::adapters::{
    Access, HashAdapter, HyperLogLogAdapter, ListAdapter, ScalarAdapter, SetAdapter, SortedSetAdapter,
    Structure,
};
use crate::batch::BatchExecutor;
use crate::config::Config;
use crate::error::Result;
use crate::keys::{StoreKey, StructureKind};
use crate::model::MemberPoint;
use crate::script::ScriptExecutor;
use crate::store::Store;
use crate::transaction::TransactionCoordinator;

/// Data-access facade for MemberPoint records
pub struct MemberPointRepository<S: Store> {
    store: S,
    config: Config,
}

impl<S: Store> std::fmt::Debug for MemberPointRepository<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberPointRepository").field("config", &self.config).finish_non_exhaustive()
    }
}

impl<S: Store> MemberPointRepository<S> {
    /// Create a repository over `store`
    ///
    /// Fails with `Error::Config` if the config is invalid. No connection is
    /// opened until the first operation.
    pub fn new(store: S, config: Config) -> Result<Self> {
        config.validate()?;
        info!(database = config.database, "member point repository ready");
        Ok(Self { store, config })
    }

    /// Repository on `database` with otherwise default config
    pub fn with_database(store: S, database: u32) -> Result<Self> {
        Self::new(store, Config::builder().database(database).build())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Key an operation on `kind` would use for `member_id`
    pub fn key(&self, kind: StructureKind, member_id: u32) -> StoreKey {
        self.config.keyspace.derive(kind, member_id)
    }

    fn access(&self) -> Access<'_, S> {
        Access::new(&self.store, &self.config)
    }

    // =========================================================================
    // Structure Adapters
    // =========================================================================

    pub fn scalar(&self) -> ScalarAdapter<'_, S> {
        ScalarAdapter::new(self.access())
    }

    pub fn hash(&self) -> HashAdapter<'_, S> {
        HashAdapter::new(self.access())
    }

    pub fn list(&self) -> ListAdapter<'_, S> {
        ListAdapter::new(self.access())
    }

    pub fn set(&self) -> SetAdapter<'_, S> {
        SetAdapter::new(self.access())
    }

    pub fn sorted_set(&self) -> SortedSetAdapter<'_, S> {
        SortedSetAdapter::new(self.access())
    }

    pub fn hyperloglog(&self) -> HyperLogLogAdapter<'_, S> {
        HyperLogLogAdapter::new(self.access())
    }

    // =========================================================================
    // Atomic Executors
    // =========================================================================

    pub fn batch(&self) -> BatchExecutor<'_, S> {
        BatchExecutor::new(self.access())
    }

    pub fn transactions(&self) -> TransactionCoordinator<'_, S> {
        TransactionCoordinator::new(self.access())
    }

    pub fn scripts(&self) -> ScriptExecutor<'_, S> {
        ScriptExecutor::new(self.access())
    }

    // =========================================================================
    // Kind-Selected Operations
    // =========================================================================

    /// Write `entity` into the structure of `kind`
    pub fn insert(&self, kind: StructureKind, entity: &MemberPoint) -> Result<bool> {
        match kind {
            StructureKind::Scalar => Structure::insert(&self.scalar(), entity),
            StructureKind::Hash => Structure::insert(&self.hash(), entity),
            StructureKind::List => Structure::insert(&self.list(), entity),
            StructureKind::Set => Structure::insert(&self.set(), entity),
            StructureKind::SortedSet => Structure::insert(&self.sorted_set(), entity),
            StructureKind::HyperLogLog => Structure::insert(&self.hyperloglog(), entity),
        }
    }

    /// Everything the structure of `kind` holds for `member_id`
    pub fn read(&self, kind: StructureKind, member_id: u32) -> Result<Vec<MemberPoint>> {
        match kind {
            StructureKind::Scalar => self.scalar().read(member_id),
            StructureKind::Hash => self.hash().read(member_id),
            StructureKind::List => self.list().read(member_id),
            StructureKind::Set => self.set().read(member_id),
            StructureKind::SortedSet => self.sorted_set().read(member_id),
            StructureKind::HyperLogLog => self.hyperloglog().read(member_id),
        }
    }

    /// Remove the key of `kind` for `member_id`; true if it existed
    pub fn delete_key(&self, kind: StructureKind, member_id: u32) -> Result<bool> {
        match kind {
            StructureKind::Scalar => self.scalar().delete(member_id),
            StructureKind::Hash => self.hash().delete(member_id),
            StructureKind::List => self.list().delete(member_id),
            StructureKind::Set => self.set().delete(member_id),
            StructureKind::SortedSet => self.sorted_set().delete(member_id),
            StructureKind::HyperLogLog => self.hyperloglog().delete(member_id),
        }
    }

    /// Set a time-to-live on the key; false if the key does not exist
    ///
    /// A zero `ttl` deletes the key.
    pub fn expire_key(&self, kind: StructureKind, member_id: u32, ttl: Duration) -> Result<bool> {
        self.access().expire_key(kind, member_id, ttl)
    }
}
