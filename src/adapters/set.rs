//! Set adapter: the points of one member as an unordered set

use bytes::Bytes;

use super::{batch_owner, decode_point, decode_points, drain_scan, require_sources, Access, Structure};
use crate::error::Result;
use crate::keys::{StoreKey, StructureKind};
use crate::model::{parse_i64, MemberPoint};
use crate::protocol::{Command, SetOp};
use crate::store::Store;

pub struct SetAdapter<'a, S: Store> {
    access: Access<'a, S>,
}

impl<'a, S: Store> SetAdapter<'a, S> {
    pub(crate) fn new(access: Access<'a, S>) -> Self {
        Self { access }
    }

    fn key(&self, member_id: u32) -> StoreKey {
        self.access.key(StructureKind::Set, member_id)
    }

    // -------------------------------------------------------------------------
    // Membership
    // -------------------------------------------------------------------------

    /// True if the point was not already present
    pub fn add(&self, entity: &MemberPoint) -> Result<bool> {
        let command = Command::SAdd { key: self.key(entity.member_id), members: vec![entity.point_value()] };
        self.access.execute("set.add", command)?.into_bool()
    }

    /// Add every point to the first entity's set; returns how many were new
    pub fn add_many(&self, entities: &[MemberPoint]) -> Result<i64> {
        let Some(member_id) = batch_owner(entities) else {
            return Ok(0);
        };
        let members = entities.iter().map(MemberPoint::point_value).collect();
        self.access.execute("set.add_many", Command::SAdd { key: self.key(member_id), members })?.into_int()
    }

    pub fn contains(&self, entity: &MemberPoint) -> Result<bool> {
        let command = Command::SIsMember { key: self.key(entity.member_id), member: entity.point_value() };
        self.access.execute("set.contains", command)?.into_bool()
    }

    pub fn members(&self, member_id: u32) -> Result<Vec<MemberPoint>> {
        let reply = self.access.execute("set.members", Command::SMembers { key: self.key(member_id) })?;
        decode_points(member_id, reply)
    }

    /// Move `point` from one member's set to another's
    ///
    /// False when `point` is not in the source set.
    pub fn move_member(&self, source: u32, destination: u32, point: i64) -> Result<bool> {
        let command = Command::SMove {
            source: self.key(source),
            destination: self.key(destination),
            member: Bytes::from(point.to_string()),
        };
        self.access.execute("set.move_member", command)?.into_bool()
    }

    pub fn remove(&self, entity: &MemberPoint) -> Result<bool> {
        let command = Command::SRem { key: self.key(entity.member_id), members: vec![entity.point_value()] };
        self.access.execute("set.remove", command)?.into_bool()
    }

    /// Remove every point from the first entity's set; returns how many went
    pub fn remove_many(&self, entities: &[MemberPoint]) -> Result<i64> {
        let Some(member_id) = batch_owner(entities) else {
            return Ok(0);
        };
        let members = entities.iter().map(MemberPoint::point_value).collect();
        self.access.execute("set.remove_many", Command::SRem { key: self.key(member_id), members })?.into_int()
    }

    // -------------------------------------------------------------------------
    // Random Access
    // -------------------------------------------------------------------------

    /// Remove and return a random point
    pub fn pop(&self, member_id: u32) -> Result<Option<MemberPoint>> {
        let reply = self.access.execute("set.pop", Command::SPop { key: self.key(member_id), count: None })?;
        decode_point(member_id, reply)
    }

    /// Remove and return up to `count` random points
    pub fn pop_many(&self, member_id: u32, count: u64) -> Result<Vec<MemberPoint>> {
        let command = Command::SPop { key: self.key(member_id), count: Some(count) };
        decode_points(member_id, self.access.execute("set.pop_many", command)?)
    }

    /// A random point, left in place
    pub fn random_member(&self, member_id: u32) -> Result<Option<MemberPoint>> {
        let command = Command::SRandMember { key: self.key(member_id), count: None };
        decode_point(member_id, self.access.execute("set.random_member", command)?)
    }

    /// Random points, left in place
    ///
    /// Positive `count` gives distinct points; negative allows repeats and
    /// returns exactly `|count|` of them.
    pub fn random_members(&self, member_id: u32, count: i64) -> Result<Vec<MemberPoint>> {
        let command = Command::SRandMember { key: self.key(member_id), count: Some(count) };
        decode_points(member_id, self.access.execute("set.random_members", command)?)
    }

    // -------------------------------------------------------------------------
    // Combination
    // -------------------------------------------------------------------------

    /// Union, intersection or difference of the members' sets
    ///
    /// Results carry `member_id` 0, since they belong to no single member.
    pub fn combine(&self, op: SetOp, member_ids: &[u32]) -> Result<Vec<MemberPoint>> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys = self.access.keys(StructureKind::Set, member_ids);
        decode_points(0, self.access.execute("set.combine", Command::SCombine { op, keys })?)
    }

    /// Combine into `destination`'s set, replacing it; returns its new size
    pub fn combine_and_store(&self, op: SetOp, destination: u32, member_ids: &[u32]) -> Result<i64> {
        require_sources("set.combine_and_store", member_ids)?;
        let command = Command::SCombineStore {
            op,
            destination: self.key(destination),
            keys: self.access.keys(StructureKind::Set, member_ids),
        };
        self.access.execute("set.combine_and_store", command)?.into_int()
    }

    /// Combine into the first member's set
    pub fn combine_and_store_into_first(&self, op: SetOp, member_ids: &[u32]) -> Result<i64> {
        require_sources("set.combine_and_store", member_ids)?;
        self.combine_and_store(op, member_ids[0], member_ids)
    }

    // -------------------------------------------------------------------------
    // Scan
    // -------------------------------------------------------------------------

    /// Points whose text starts with `entity.point`
    ///
    /// See [`scan_pattern`](Self::scan_pattern) for paging.
    pub fn scan(&self, entity: &MemberPoint, page_size: usize, page_offset: usize) -> Result<Vec<MemberPoint>> {
        self.scan_pattern(entity.member_id, &format!("{}*", entity.point), page_size, page_offset)
    }

    /// Every point matching the glob `pattern`
    ///
    /// The cursor is followed to the end. `page_size` is a hint per round
    /// trip (0 uses the configured default); the first `page_offset` matches
    /// are skipped.
    pub fn scan_pattern(
        &self,
        member_id: u32,
        pattern: &str,
        page_size: usize,
        page_offset: usize,
    ) -> Result<Vec<MemberPoint>> {
        let key = self.key(member_id);
        let count = self.access.config().page_size(page_size);
        let items = self.access.with_connection("set.scan", |conn| {
            drain_scan(conn, |cursor| Command::SScan {
                key: key.clone(),
                cursor,
                pattern: Some(pattern.to_string()),
                count: Some(count),
            })
        })?;

        items
            .iter()
            .skip(page_offset)
            .map(|b| Ok(MemberPoint::new(member_id, parse_i64(b)?)))
            .collect()
    }
}

impl<'a, S: Store> Structure for SetAdapter<'a, S> {
    const KIND: StructureKind = StructureKind::Set;

    fn insert(&self, entity: &MemberPoint) -> Result<bool> {
        self.add(entity)
    }

    fn read(&self, member_id: u32) -> Result<Vec<MemberPoint>> {
        self.members(member_id)
    }

    fn delete(&self, member_id: u32) -> Result<bool> {
        self.access.delete_key(Self::KIND, member_id)
    }
}
