//! List adapter: records serialized as JSON elements

use bytes::Bytes;

use super::{batch_owner, Access, Structure};
use crate::error::Result;
use crate::keys::{StoreKey, StructureKind};
use crate::model::MemberPoint;
use crate::protocol::{Command, InsertPosition, Reply};
use crate::store::Store;

pub struct ListAdapter<'a, S: Store> {
    access: Access<'a, S>,
}

impl<'a, S: Store> ListAdapter<'a, S> {
    pub(crate) fn new(access: Access<'a, S>) -> Self {
        Self { access }
    }

    fn key(&self, member_id: u32) -> StoreKey {
        self.access.key(StructureKind::List, member_id)
    }

    // -------------------------------------------------------------------------
    // Push / Pop
    // -------------------------------------------------------------------------

    /// Push onto the head; returns the new length
    pub fn push_left(&self, entity: &MemberPoint) -> Result<i64> {
        self.push("list.push_left", std::slice::from_ref(entity), true)
    }

    /// Push onto the tail; returns the new length
    pub fn push_right(&self, entity: &MemberPoint) -> Result<i64> {
        self.push("list.push_right", std::slice::from_ref(entity), false)
    }

    /// Push every entity onto the head of the first entity's list
    ///
    /// Each element lands at the head in turn, so the last entity ends up
    /// first. An empty slice sends nothing and returns 0.
    pub fn push_left_many(&self, entities: &[MemberPoint]) -> Result<i64> {
        self.push("list.push_left_many", entities, true)
    }

    /// Push every entity onto the tail of the first entity's list
    pub fn push_right_many(&self, entities: &[MemberPoint]) -> Result<i64> {
        self.push("list.push_right_many", entities, false)
    }

    fn push(&self, operation: &'static str, entities: &[MemberPoint], left: bool) -> Result<i64> {
        let Some(member_id) = batch_owner(entities) else {
            return Ok(0);
        };
        let key = self.key(member_id);
        let values = entities.iter().map(MemberPoint::to_json).collect::<Result<Vec<_>>>()?;
        let command = if left {
            Command::LPush { key, values }
        } else {
            Command::RPush { key, values }
        };
        self.access.execute(operation, command)?.into_int()
    }

    pub fn pop_left(&self, member_id: u32) -> Result<Option<MemberPoint>> {
        let key = self.key(member_id);
        decode_element(self.access.execute("list.pop_left", Command::LPop { key })?)
    }

    pub fn pop_right(&self, member_id: u32) -> Result<Option<MemberPoint>> {
        let key = self.key(member_id);
        decode_element(self.access.execute("list.pop_right", Command::RPop { key })?)
    }

    /// Pop the tail of `source` and push it onto the head of `destination`
    ///
    /// Returns the moved element; `None` when `source` is empty.
    pub fn move_right_pop_left_push(&self, source: u32, destination: u32) -> Result<Option<MemberPoint>> {
        let command = Command::RPopLPush { source: self.key(source), destination: self.key(destination) };
        decode_element(self.access.execute("list.move_right_pop_left_push", command)?)
    }

    // -------------------------------------------------------------------------
    // Positional Access
    // -------------------------------------------------------------------------

    /// Element at `index`; negative indexes count from the tail
    pub fn find_by_index(&self, member_id: u32, index: i64) -> Result<Option<MemberPoint>> {
        let key = self.key(member_id);
        decode_element(self.access.execute("list.find_by_index", Command::LIndex { key, index })?)
    }

    /// Insert `value` before the first element equal to `pivot`
    ///
    /// The list is `pivot`'s. Returns the new length, -1 when the pivot is
    /// not in the list, or 0 when the list does not exist.
    pub fn insert_before(&self, pivot: &MemberPoint, value: &MemberPoint) -> Result<i64> {
        self.insert_at("list.insert_before", InsertPosition::Before, pivot, value)
    }

    /// Insert `value` after the first element equal to `pivot`
    pub fn insert_after(&self, pivot: &MemberPoint, value: &MemberPoint) -> Result<i64> {
        self.insert_at("list.insert_after", InsertPosition::After, pivot, value)
    }

    fn insert_at(
        &self,
        operation: &'static str,
        position: InsertPosition,
        pivot: &MemberPoint,
        value: &MemberPoint,
    ) -> Result<i64> {
        let command = Command::LInsert {
            key: self.key(pivot.member_id),
            position,
            pivot: pivot.to_json()?,
            value: value.to_json()?,
        };
        self.access.execute(operation, command)?.into_int()
    }

    /// Remove every occurrence of `entity`; returns how many were removed
    pub fn remove(&self, entity: &MemberPoint) -> Result<i64> {
        let command = Command::LRem { key: self.key(entity.member_id), count: 0, value: entity.to_json()? };
        self.access.execute("list.remove", command)?.into_int()
    }

    /// Whole list, head first
    pub fn range(&self, member_id: u32) -> Result<Vec<MemberPoint>> {
        let key = self.key(member_id);
        let items = self
            .access
            .execute("list.range", Command::LRange { key, start: 0, stop: -1 })?
            .into_bytes_list()?;
        items.iter().map(|b| MemberPoint::from_json(b)).collect()
    }

    pub fn length(&self, member_id: u32) -> Result<i64> {
        let key = self.key(member_id);
        self.access.execute("list.length", Command::LLen { key })?.into_int()
    }
}

fn decode_element(reply: Reply) -> Result<Option<MemberPoint>> {
    reply
        .into_bytes()?
        .map(|b: Bytes| MemberPoint::from_json(&b))
        .transpose()
}

impl<'a, S: Store> Structure for ListAdapter<'a, S> {
    const KIND: StructureKind = StructureKind::List;

    fn insert(&self, entity: &MemberPoint) -> Result<bool> {
        Ok(self.push_right(entity)? > 0)
    }

    fn read(&self, member_id: u32) -> Result<Vec<MemberPoint>> {
        self.range(member_id)
    }

    fn delete(&self, member_id: u32) -> Result<bool> {
        self.access.delete_key(Self::KIND, member_id)
    }
}
