//! Hash adapter: the record as `MemberId` / `Point` fields

use bytes::Bytes;

use super::{Access, Structure};
use crate::batch::BatchExecutor;
use crate::error::{Error, Result};
use crate::keys::{StoreKey, StructureKind};
use crate::model::{parse_i64, MemberPoint, MEMBER_ID_FIELD, POINT_FIELD};
use crate::protocol::Command;
use crate::store::Store;

pub struct HashAdapter<'a, S: Store> {
    access: Access<'a, S>,
}

impl<'a, S: Store> HashAdapter<'a, S> {
    pub(crate) fn new(access: Access<'a, S>) -> Self {
        Self { access }
    }

    fn key(&self, member_id: u32) -> StoreKey {
        self.access.key(StructureKind::Hash, member_id)
    }

    /// Write both fields
    pub fn insert(&self, entity: &MemberPoint) -> Result<bool> {
        self.write("hash.insert", entity)
    }

    pub fn update(&self, entity: &MemberPoint) -> Result<bool> {
        self.write("hash.update", entity)
    }

    fn write(&self, operation: &'static str, entity: &MemberPoint) -> Result<bool> {
        let key = self.key(entity.member_id);
        let fields = vec![
            (MEMBER_ID_FIELD.to_string(), Bytes::from(entity.member_id.to_string())),
            (POINT_FIELD.to_string(), entity.point_value()),
        ];
        self.access.execute(operation, Command::HSet { key, fields })?;
        Ok(true)
    }

    /// Add `delta` to the Point field, returning the new value
    pub fn increment_field(&self, member_id: u32, delta: i64) -> Result<i64> {
        let key = self.key(member_id);
        let field = POINT_FIELD.to_string();
        self.access.execute("hash.increment_field", Command::HIncrBy { key, field, delta })?.into_int()
    }

    pub fn decrement_field(&self, member_id: u32, delta: i64) -> Result<i64> {
        let delta = delta
            .checked_neg()
            .ok_or_else(|| Error::Server("ERR decrement would overflow".to_string()))?;
        let key = self.key(member_id);
        let field = POINT_FIELD.to_string();
        self.access.execute("hash.decrement_field", Command::HIncrBy { key, field, delta })?.into_int()
    }

    /// Rebuild the record from all fields
    ///
    /// A field that is missing reads as 0. An absent key is `None`.
    pub fn find_all(&self, member_id: u32) -> Result<Option<MemberPoint>> {
        let key = self.key(member_id);
        let pairs = self.access.execute("hash.find_all", Command::HGetAll { key })?.into_pairs()?;
        if pairs.is_empty() {
            return Ok(None);
        }

        let mut entity = MemberPoint::default();
        for (field, value) in pairs {
            match &field[..] {
                f if f == MEMBER_ID_FIELD.as_bytes() => {
                    let id = parse_i64(&value)?;
                    entity.member_id = u32::try_from(id)
                        .map_err(|_| Error::Serialization(format!("member id {} out of range", id)))?;
                }
                f if f == POINT_FIELD.as_bytes() => entity.point = parse_i64(&value)?,
                _ => {}
            }
        }
        Ok(Some(entity))
    }

    /// Read only the Point field
    pub fn find_field(&self, member_id: u32) -> Result<Option<MemberPoint>> {
        let key = self.key(member_id);
        let field = POINT_FIELD.to_string();
        let reply = self.access.execute("hash.find_field", Command::HGet { key, field })?;
        super::decode_point(member_id, reply)
    }

    /// Pipelined Point reads, ordered by member id
    pub fn batch_find(&self, member_ids: &[u32]) -> Result<Vec<MemberPoint>> {
        let found = BatchExecutor::new(self.access).batch_get_hash(member_ids)?;
        Ok(found.into_iter().map(|(id, point)| MemberPoint::new(id, point)).collect())
    }
}

impl<'a, S: Store> Structure for HashAdapter<'a, S> {
    const KIND: StructureKind = StructureKind::Hash;

    fn insert(&self, entity: &MemberPoint) -> Result<bool> {
        HashAdapter::insert(self, entity)
    }

    fn read(&self, member_id: u32) -> Result<Vec<MemberPoint>> {
        Ok(self.find_all(member_id)?.into_iter().collect())
    }

    fn delete(&self, member_id: u32) -> Result<bool> {
        self.access.delete_key(Self::KIND, member_id)
    }
}
