//! Scalar adapter: the point stored as a plain string value

use std::time::Duration;

use super::{decode_point, Access, Structure};
use crate::batch::BatchExecutor;
use crate::error::{Error, Result};
use crate::keys::{StoreKey, StructureKind};
use crate::model::{parse_i64, MemberPoint};
use crate::protocol::Command;
use crate::store::Store;

pub struct ScalarAdapter<'a, S: Store> {
    access: Access<'a, S>,
}

impl<'a, S: Store> ScalarAdapter<'a, S> {
    pub(crate) fn new(access: Access<'a, S>) -> Self {
        Self { access }
    }

    fn key(&self, member_id: u32) -> StoreKey {
        self.access.key(StructureKind::Scalar, member_id)
    }

    /// Store the point, replacing any previous value
    ///
    /// With `ttl` the key expires after that long, rounded up to whole
    /// milliseconds; a zero `ttl` is rejected. Without it any previous
    /// expiry is cleared.
    pub fn insert(&self, entity: &MemberPoint, ttl: Option<Duration>) -> Result<bool> {
        self.write("scalar.insert", entity, ttl)
    }

    /// Same write as [`insert`](Self::insert)
    pub fn update(&self, entity: &MemberPoint, ttl: Option<Duration>) -> Result<bool> {
        self.write("scalar.update", entity, ttl)
    }

    fn write(&self, operation: &'static str, entity: &MemberPoint, ttl: Option<Duration>) -> Result<bool> {
        let ttl = ttl.map(expiry_millis).transpose()?;
        let key = self.key(entity.member_id);
        self.access.execute(operation, Command::Set { key, value: entity.point_value(), ttl })?;
        Ok(true)
    }

    /// Add `delta`, returning the new value; an absent key counts as 0
    pub fn increment(&self, member_id: u32, delta: i64) -> Result<i64> {
        let key = self.key(member_id);
        self.access.execute("scalar.increment", Command::IncrBy { key, delta })?.into_int()
    }

    /// Subtract `delta`, returning the new value
    pub fn decrement(&self, member_id: u32, delta: i64) -> Result<i64> {
        let delta = delta
            .checked_neg()
            .ok_or_else(|| Error::Server("ERR decrement would overflow".to_string()))?;
        let key = self.key(member_id);
        self.access.execute("scalar.decrement", Command::IncrBy { key, delta })?.into_int()
    }

    pub fn find(&self, member_id: u32) -> Result<Option<MemberPoint>> {
        let key = self.key(member_id);
        let reply = self.access.execute("scalar.find", Command::Get { key })?;
        decode_point(member_id, reply)
    }

    /// Multi-get in one command; absent members are omitted
    ///
    /// Results follow the order of `member_ids`.
    pub fn find_many(&self, member_ids: &[u32]) -> Result<Vec<MemberPoint>> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys = self.access.keys(StructureKind::Scalar, member_ids);
        let replies = self.access.execute("scalar.find_many", Command::MGet { keys })?.into_array()?;

        let mut found = Vec::with_capacity(replies.len());
        for (&member_id, reply) in member_ids.iter().zip(replies) {
            if let Some(b) = reply.into_bytes()? {
                found.push(MemberPoint::new(member_id, parse_i64(&b)?));
            }
        }
        Ok(found)
    }

    /// Pipelined get, ordered by member id
    ///
    /// Members whose read failed or came back empty are omitted.
    pub fn batch_find(&self, member_ids: &[u32]) -> Result<Vec<MemberPoint>> {
        let found = BatchExecutor::new(self.access).batch_get(member_ids)?;
        Ok(found.into_iter().map(|(id, point)| MemberPoint::new(id, point)).collect())
    }
}

/// Round a `SET` expiry up to whole milliseconds; zero is rejected
fn expiry_millis(ttl: Duration) -> Result<Duration> {
    if ttl.is_zero() {
        return Err(Error::Server("invalid expire time in 'set' command".to_string()));
    }
    let millis = u64::try_from(ttl.as_nanos().div_ceil(1_000_000))
        .map_err(|_| Error::Server("invalid expire time in 'set' command".to_string()))?;
    Ok(Duration::from_millis(millis))
}

impl<'a, S: Store> Structure for ScalarAdapter<'a, S> {
    const KIND: StructureKind = StructureKind::Scalar;

    fn insert(&self, entity: &MemberPoint) -> Result<bool> {
        ScalarAdapter::insert(self, entity, None)
    }

    fn read(&self, member_id: u32) -> Result<Vec<MemberPoint>> {
        Ok(self.find(member_id)?.into_iter().collect())
    }

    fn delete(&self, member_id: u32) -> Result<bool> {
        self.access.delete_key(Self::KIND, member_id)
    }
}
