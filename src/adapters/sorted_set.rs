//! Sorted-set adapter
//!
//! Each point is stored as the member `"Point<point>"` with the point as its
//! score, so score order is point order and lexicographic ranges work on the
//! member text.
//!
//! Reads that return `MemberPoint`s carry the score as the point, rounded to
//! the nearest integer. A score moved off an integer by
//! [`SortedSetAdapter::increment_score`] reads back rounded; use
//! [`SortedSetAdapter::score`] for the exact value.

use bytes::Bytes;

use super::{batch_owner, decode_text, drain_scan, require_sources, Access, Structure};
use crate::error::{Error, Result};
use crate::keys::{StoreKey, StructureKind};
use crate::model::{parse_f64, sorted_set_member, MemberPoint};
use crate::protocol::{Aggregate, Command, LexBound, Reply, SortedSetOp};
use crate::store::Store;

pub struct SortedSetAdapter<'a, S: Store> {
    access: Access<'a, S>,
}

impl<'a, S: Store> SortedSetAdapter<'a, S> {
    pub(crate) fn new(access: Access<'a, S>) -> Self {
        Self { access }
    }

    fn key(&self, member_id: u32) -> StoreKey {
        self.access.key(StructureKind::SortedSet, member_id)
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// True if the member was new; re-adding only updates the score
    pub fn add(&self, entity: &MemberPoint) -> Result<bool> {
        let command = Command::ZAdd { key: self.key(entity.member_id), members: vec![scored(entity)] };
        self.access.execute("sorted_set.add", command)?.into_bool()
    }

    /// Add every entity to the first entity's set; returns how many were new
    pub fn add_many(&self, entities: &[MemberPoint]) -> Result<i64> {
        let Some(member_id) = batch_owner(entities) else {
            return Ok(0);
        };
        let members = entities.iter().map(scored).collect();
        self.access.execute("sorted_set.add_many", Command::ZAdd { key: self.key(member_id), members })?.into_int()
    }

    /// Add `delta` to the entity's member score, returning the new score
    ///
    /// An absent member starts from 0.
    pub fn increment_score(&self, entity: &MemberPoint, delta: f64) -> Result<f64> {
        self.incr("sorted_set.increment_score", entity, delta)
    }

    pub fn decrement_score(&self, entity: &MemberPoint, delta: f64) -> Result<f64> {
        self.incr("sorted_set.decrement_score", entity, -delta)
    }

    fn incr(&self, operation: &'static str, entity: &MemberPoint, delta: f64) -> Result<f64> {
        let command = Command::ZIncrBy {
            key: self.key(entity.member_id),
            delta,
            member: Bytes::from(entity.sorted_set_member()),
        };
        self.access
            .execute(operation, command)?
            .into_score()?
            .ok_or_else(|| Error::Server(format!("{}: nil score reply", operation)))
    }

    pub fn remove(&self, entity: &MemberPoint) -> Result<bool> {
        let command = Command::ZRem { key: self.key(entity.member_id), members: vec![member_of(entity)] };
        self.access.execute("sorted_set.remove", command)?.into_bool()
    }

    pub fn remove_many(&self, entities: &[MemberPoint]) -> Result<i64> {
        let Some(member_id) = batch_owner(entities) else {
            return Ok(0);
        };
        let members = entities.iter().map(member_of).collect();
        self.access.execute("sorted_set.remove_many", Command::ZRem { key: self.key(member_id), members })?.into_int()
    }

    /// Remove members ranked `start..=stop`; negative ranks count from the top
    pub fn remove_range_by_rank(&self, member_id: u32, start: i64, stop: i64) -> Result<i64> {
        let command = Command::ZRemRangeByRank { key: self.key(member_id), start, stop };
        self.access.execute("sorted_set.remove_range_by_rank", command)?.into_int()
    }

    /// Remove members scored within `min..=max`
    pub fn remove_range_by_score(&self, member_id: u32, min: f64, max: f64) -> Result<i64> {
        let command = Command::ZRemRangeByScore { key: self.key(member_id), min, max };
        self.access.execute("sorted_set.remove_range_by_score", command)?.into_int()
    }

    /// Remove members whose text lies between the bounds
    pub fn remove_range_by_value(&self, member_id: u32, min: LexBound, max: LexBound) -> Result<i64> {
        let command = Command::ZRemRangeByLex { key: self.key(member_id), min, max };
        self.access.execute("sorted_set.remove_range_by_value", command)?.into_int()
    }

    // -------------------------------------------------------------------------
    // Combination
    // -------------------------------------------------------------------------

    /// Union or intersection into `destination`, summing scores
    ///
    /// Replaces `destination`; returns its new size.
    pub fn combine_and_store(&self, op: SortedSetOp, destination: u32, member_ids: &[u32]) -> Result<i64> {
        require_sources("sorted_set.combine_and_store", member_ids)?;
        let command = Command::ZCombineStore {
            op,
            destination: self.key(destination),
            keys: self.access.keys(StructureKind::SortedSet, member_ids),
            aggregate: Aggregate::Sum,
        };
        self.access.execute("sorted_set.combine_and_store", command)?.into_int()
    }

    /// Combine into the first member's set
    pub fn combine_and_store_into_first(&self, op: SortedSetOp, member_ids: &[u32]) -> Result<i64> {
        require_sources("sorted_set.combine_and_store", member_ids)?;
        self.combine_and_store(op, member_ids[0], member_ids)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn length(&self, member_id: u32) -> Result<i64> {
        self.access.execute("sorted_set.length", Command::ZCard { key: self.key(member_id) })?.into_int()
    }

    /// Number of members whose text lies between the bounds
    pub fn length_by_value(&self, member_id: u32, min: LexBound, max: LexBound) -> Result<i64> {
        let command = Command::ZLexCount { key: self.key(member_id), min, max };
        self.access.execute("sorted_set.length_by_value", command)?.into_int()
    }

    /// Remove and return the lowest-scored member
    pub fn pop(&self, member_id: u32) -> Result<Option<MemberPoint>> {
        Ok(self.pop_with("sorted_set.pop", member_id, None)?.into_iter().next())
    }

    /// Remove and return up to `count` members, lowest score first
    pub fn pop_many(&self, member_id: u32, count: u64) -> Result<Vec<MemberPoint>> {
        self.pop_with("sorted_set.pop_many", member_id, Some(count))
    }

    fn pop_with(&self, operation: &'static str, member_id: u32, count: Option<u64>) -> Result<Vec<MemberPoint>> {
        let reply = self.access.execute(operation, Command::ZPopMin { key: self.key(member_id), count })?;
        decode_scored(member_id, reply)
    }

    /// Member texts ranked `start..=stop`, lowest score first
    pub fn range_by_rank(&self, member_id: u32, start: i64, stop: i64) -> Result<Vec<String>> {
        let command = Command::ZRange { key: self.key(member_id), start, stop, with_scores: false };
        decode_members(self.access.execute("sorted_set.range_by_rank", command)?)
    }

    /// Like [`range_by_rank`](Self::range_by_rank), with each score as the point
    pub fn range_by_rank_with_scores(&self, member_id: u32, start: i64, stop: i64) -> Result<Vec<MemberPoint>> {
        let command = Command::ZRange { key: self.key(member_id), start, stop, with_scores: true };
        decode_scored(member_id, self.access.execute("sorted_set.range_by_rank_with_scores", command)?)
    }

    /// Member texts scored within `min..=max`
    pub fn range_by_score(&self, member_id: u32, min: f64, max: f64) -> Result<Vec<String>> {
        let command = Command::ZRangeByScore { key: self.key(member_id), min, max, with_scores: false };
        decode_members(self.access.execute("sorted_set.range_by_score", command)?)
    }

    pub fn range_by_score_with_scores(&self, member_id: u32, min: f64, max: f64) -> Result<Vec<MemberPoint>> {
        let command = Command::ZRangeByScore { key: self.key(member_id), min, max, with_scores: true };
        decode_scored(member_id, self.access.execute("sorted_set.range_by_score_with_scores", command)?)
    }

    /// Member texts between the bounds
    ///
    /// Only meaningful when all members share a score, as lexicographic
    /// order is taken within score order.
    pub fn range_by_value(&self, member_id: u32, min: LexBound, max: LexBound) -> Result<Vec<String>> {
        let command = Command::ZRangeByLex { key: self.key(member_id), min, max };
        decode_members(self.access.execute("sorted_set.range_by_value", command)?)
    }

    /// Zero-based rank of `member`, lowest score first
    pub fn rank(&self, member_id: u32, member: &str) -> Result<Option<i64>> {
        let command = Command::ZRank { key: self.key(member_id), member: Bytes::from(member.to_string()) };
        let reply = self.access.execute("sorted_set.rank", command)?;
        if reply.is_nil() {
            return Ok(None);
        }
        Ok(Some(reply.into_int()?))
    }

    pub fn score(&self, member_id: u32, member: &str) -> Result<Option<f64>> {
        let command = Command::ZScore { key: self.key(member_id), member: Bytes::from(member.to_string()) };
        self.access.execute("sorted_set.score", command)?.into_score()
    }

    /// Rank of the entity's member in the entity's own set
    pub fn rank_of(&self, entity: &MemberPoint) -> Result<Option<i64>> {
        self.rank(entity.member_id, &sorted_set_member(entity.point))
    }

    /// Current score of the entity's member in the entity's own set
    pub fn score_of(&self, entity: &MemberPoint) -> Result<Option<f64>> {
        self.score(entity.member_id, &sorted_set_member(entity.point))
    }

    /// Every member matching the glob `pattern`, with its score as the point
    ///
    /// Paging follows [`SetAdapter::scan_pattern`](super::SetAdapter::scan_pattern).
    pub fn scan(
        &self,
        member_id: u32,
        pattern: &str,
        page_size: usize,
        page_offset: usize,
    ) -> Result<Vec<MemberPoint>> {
        let key = self.key(member_id);
        let count = self.access.config().page_size(page_size);
        let items = self.access.with_connection("sorted_set.scan", |conn| {
            drain_scan(conn, |cursor| Command::ZScan {
                key: key.clone(),
                cursor,
                pattern: Some(pattern.to_string()),
                count: Some(count),
            })
        })?;

        let flat = Reply::bulks(items);
        Ok(decode_scored(member_id, flat)?.into_iter().skip(page_offset).collect())
    }
}

/// Score/member pair for an entity
fn scored(entity: &MemberPoint) -> (f64, Bytes) {
    (entity.point as f64, member_of(entity))
}

fn member_of(entity: &MemberPoint) -> Bytes {
    Bytes::from(sorted_set_member(entity.point))
}

fn decode_members(reply: Reply) -> Result<Vec<String>> {
    reply.into_bytes_list()?.into_iter().map(decode_text).collect()
}

/// Flat `[member, score, ...]` reply; each score, rounded, becomes the point
fn decode_scored(member_id: u32, reply: Reply) -> Result<Vec<MemberPoint>> {
    reply
        .into_pairs()?
        .into_iter()
        .map(|(_, score)| Ok(MemberPoint::new(member_id, parse_f64(&score)?.round() as i64)))
        .collect()
}

impl<'a, S: Store> Structure for SortedSetAdapter<'a, S> {
    const KIND: StructureKind = StructureKind::SortedSet;

    fn insert(&self, entity: &MemberPoint) -> Result<bool> {
        self.add(entity)
    }

    fn read(&self, member_id: u32) -> Result<Vec<MemberPoint>> {
        self.range_by_rank_with_scores(member_id, 0, -1)
    }

    fn delete(&self, member_id: u32) -> Result<bool> {
        self.access.delete_key(Self::KIND, member_id)
    }
}
