//! Script Executor
//!
//! Check-then-act on a hash record as one indivisible server-side step.
//! Concurrent callers racing `add_if_not_exist` on the same member see
//! exactly one winner.

use bytes::Bytes;
use tracing::debug;

use crate::adapters::Access;
use crate::error::Result;
use crate::keys::StructureKind;
use crate::model::MemberPoint;
use crate::store::{Connection, Script, Store};

/// Create the hash record with both fields and a TTL, unless the key exists
///
/// KEYS[1] = hash key, ARGV = member id, point, ttl seconds.
pub const ADD_IF_NOT_EXIST: Script = Script {
    name: "add_if_not_exist",
    body: r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('HSET', KEYS[1], 'MemberId', ARGV[1], 'Point', ARGV[2])
redis.call('EXPIRE', KEYS[1], ARGV[3])
return 1
"#,
};

/// Add a delta to the Point field, only if the key exists
///
/// KEYS[1] = hash key, ARGV = delta.
pub const UPDATE_IF_EXIST: Script = Script {
    name: "update_if_exist",
    body: r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return 0
end
redis.call('HINCRBY', KEYS[1], 'Point', ARGV[1])
return 1
"#,
};

/// Runs the crate's scripts against hash keys
pub struct ScriptExecutor<'a, S: Store> {
    access: Access<'a, S>,
}

impl<'a, S: Store> ScriptExecutor<'a, S> {
    pub(crate) fn new(access: Access<'a, S>) -> Self {
        Self { access }
    }

    /// Create the member's hash record if absent; true if it was created
    ///
    /// The record expires after the configured script TTL.
    pub fn add_if_not_exist(&self, entity: &MemberPoint) -> Result<bool> {
        let key = self.access.key(StructureKind::Hash, entity.member_id);
        let ttl_secs = self.access.config().script_ttl.as_secs().max(1);
        let args = [
            Bytes::from(entity.member_id.to_string()),
            entity.point_value(),
            Bytes::from(ttl_secs.to_string()),
        ];

        let created = self
            .access
            .with_connection("script.add_if_not_exist", |conn| {
                conn.eval(&ADD_IF_NOT_EXIST, std::slice::from_ref(&key), &args)
            })?
            .into_bool()?;

        debug!(member_id = entity.member_id, created, "add_if_not_exist");
        Ok(created)
    }

    /// Add `delta` to the Point field of `entity`'s record if it exists
    ///
    /// Only `entity.member_id` selects the record; its point is not read.
    pub fn update_if_exist(&self, entity: &MemberPoint, delta: i64) -> Result<bool> {
        let key = self.access.key(StructureKind::Hash, entity.member_id);
        let args = [Bytes::from(delta.to_string())];

        let updated = self
            .access
            .with_connection("script.update_if_exist", |conn| {
                conn.eval(&UPDATE_IF_EXIST, std::slice::from_ref(&key), &args)
            })?
            .into_bool()?;

        debug!(member_id = entity.member_id, delta, updated, "update_if_exist");
        Ok(updated)
    }
}
