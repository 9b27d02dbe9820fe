//! Structure Adapters
//!
//! One adapter per structure kind. Each borrows an [`Access`] (store handle
//! plus config) from the repository and opens a fresh connection for every
//! operation.
//!
//! ## Capability Surface
//! All six implement [`Structure`]: `insert`, `read`, `delete`. The rest of
//! each adapter is that structure's own algebra (push/pop for lists,
//! combine for sets, ranges for sorted sets, merge for HyperLogLog).

mod hash;
mod hyperloglog;
mod list;
mod scalar;
mod set;
mod sorted_set;

pub use hash::HashAdapter;
pub use hyperloglog::HyperLogLogAdapter;
pub use list::ListAdapter;
pub use scalar::ScalarAdapter;
pub use set::SetAdapter;
pub use sorted_set::SortedSetAdapter;

use std::time::Duration;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::keys::{StoreKey, StructureKind};
use crate::model::{parse_i64, MemberPoint};
use crate::protocol::{Command, Reply};
use crate::store::{Connection, Store};

/// Uniform capabilities every structure kind offers
pub trait Structure {
    /// Kind whose namespace the adapter's keys live in
    const KIND: StructureKind;

    /// Write the entity in this structure's natural way
    ///
    /// True when the store reports the entity as newly written.
    fn insert(&self, entity: &MemberPoint) -> Result<bool>;

    /// Everything the structure holds for `member_id`
    fn read(&self, member_id: u32) -> Result<Vec<MemberPoint>>;

    /// Remove the whole value; true if it existed
    fn delete(&self, member_id: u32) -> Result<bool>;
}

// =============================================================================
// Access
// =============================================================================

/// Store handle and config borrowed from the repository
pub struct Access<'a, S: Store> {
    store: &'a S,
    config: &'a Config,
}

impl<'a, S: Store> Clone for Access<'a, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S: Store> Copy for Access<'a, S> {}

impl<'a, S: Store> Access<'a, S> {
    pub(crate) fn new(store: &'a S, config: &'a Config) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    pub fn key(&self, kind: StructureKind, member_id: u32) -> StoreKey {
        self.config.keyspace.derive(kind, member_id)
    }

    pub fn keys(&self, kind: StructureKind, member_ids: &[u32]) -> Vec<StoreKey> {
        self.config.keyspace.derive_all(kind, member_ids.iter().copied())
    }

    /// Run `f` on a connection scoped to this call
    ///
    /// Faults are logged here, where they are converted, and returned.
    pub(crate) fn with_connection<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut S::Connection) -> Result<T>,
    {
        let result = self
            .store
            .connect(self.config.database)
            .and_then(|mut conn| f(&mut conn));

        if let Err(e) = &result {
            tracing::warn!(operation, database = self.config.database, error = %e, "store call failed");
        }
        result
    }

    /// Run a single command
    pub(crate) fn execute(&self, operation: &'static str, command: Command) -> Result<Reply> {
        self.with_connection(operation, |conn| conn.execute(command))
    }

    pub(crate) fn delete_key(&self, kind: StructureKind, member_id: u32) -> Result<bool> {
        let key = self.key(kind, member_id);
        self.execute("key.delete", Command::Del { key })?.into_bool()
    }

    pub(crate) fn expire_key(&self, kind: StructureKind, member_id: u32, ttl: Duration) -> Result<bool> {
        let key = self.key(kind, member_id);
        self.execute("key.expire", Command::Expire { key, ttl })?.into_bool()
    }
}

// =============================================================================
// Decoding Helpers
// =============================================================================

/// Array of raw point values, tagged with `member_id`
pub(crate) fn decode_points(member_id: u32, reply: Reply) -> Result<Vec<MemberPoint>> {
    reply
        .into_bytes_list()?
        .iter()
        .map(|b| Ok(MemberPoint::new(member_id, parse_i64(b)?)))
        .collect()
}

/// Bulk point value or nil
pub(crate) fn decode_point(member_id: u32, reply: Reply) -> Result<Option<MemberPoint>> {
    match reply.into_bytes()? {
        Some(b) => Ok(Some(MemberPoint::new(member_id, parse_i64(&b)?))),
        None => Ok(None),
    }
}

/// Bulk string as UTF-8 text
pub(crate) fn decode_text(bytes: Bytes) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::Serialization(e.to_string()))
}

/// Follow a scan cursor until it returns to 0, collecting every item
///
/// `page` builds the command for a cursor. Its COUNT is only a hint: the
/// store may return more or fewer items per page.
pub(crate) fn drain_scan<C, F>(conn: &mut C, page: F) -> Result<Vec<Bytes>>
where
    C: Connection,
    F: Fn(u64) -> Command,
{
    let mut items = Vec::new();
    let mut cursor = 0u64;
    loop {
        let (next, batch) = conn.execute(page(cursor))?.into_scan_page()?;
        items.extend(batch.into_bytes_list()?);
        if next == 0 {
            return Ok(items);
        }
        cursor = next;
    }
}

/// Key of the first entity of a batch; None for an empty batch
pub(crate) fn batch_owner(entities: &[MemberPoint]) -> Option<u32> {
    entities.first().map(|e| e.member_id)
}

/// Reject combine commands without sources
pub(crate) fn require_sources(operation: &str, member_ids: &[u32]) -> Result<()> {
    if member_ids.is_empty() {
        return Err(Error::Server(format!("{}: at least one source member is required", operation)));
    }
    Ok(())
}
