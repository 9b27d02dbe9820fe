//! HyperLogLog adapter: approximate count of distinct points per member

use super::{batch_owner, Access, Structure};
use crate::error::Result;
use crate::keys::{StoreKey, StructureKind};
use crate::model::MemberPoint;
use crate::protocol::Command;
use crate::store::Store;

pub struct HyperLogLogAdapter<'a, S: Store> {
    access: Access<'a, S>,
}

impl<'a, S: Store> HyperLogLogAdapter<'a, S> {
    pub(crate) fn new(access: Access<'a, S>) -> Self {
        Self { access }
    }

    fn key(&self, member_id: u32) -> StoreKey {
        self.access.key(StructureKind::HyperLogLog, member_id)
    }

    /// Observe the point; true if the estimate may have changed
    pub fn add(&self, entity: &MemberPoint) -> Result<bool> {
        let command = Command::PfAdd { key: self.key(entity.member_id), elements: vec![entity.point_value()] };
        self.access.execute("hyperloglog.add", command)?.into_bool()
    }

    /// Observe every point under the first entity's key
    pub fn add_many(&self, entities: &[MemberPoint]) -> Result<bool> {
        let Some(member_id) = batch_owner(entities) else {
            return Ok(false);
        };
        let elements = entities.iter().map(MemberPoint::point_value).collect();
        self.access.execute("hyperloglog.add_many", Command::PfAdd { key: self.key(member_id), elements })?.into_bool()
    }

    /// Estimated distinct points; 0 for an absent key
    pub fn length(&self, member_id: u32) -> Result<i64> {
        self.access.execute("hyperloglog.length", Command::PfCount { keys: vec![self.key(member_id)] })?.into_int()
    }

    /// Estimated distinct points across all the members' keys
    pub fn length_union(&self, member_ids: &[u32]) -> Result<i64> {
        if member_ids.is_empty() {
            return Ok(0);
        }
        let keys = self.access.keys(StructureKind::HyperLogLog, member_ids);
        self.access.execute("hyperloglog.length_union", Command::PfCount { keys })?.into_int()
    }

    /// Merge the sources into `destination`; the sources are not modified
    pub fn merge(&self, destination: u32, sources: &[u32]) -> Result<()> {
        let command = Command::PfMerge {
            destination: self.key(destination),
            sources: self.access.keys(StructureKind::HyperLogLog, sources),
        };
        self.access.execute("hyperloglog.merge", command)?;
        Ok(())
    }
}

impl<'a, S: Store> Structure for HyperLogLogAdapter<'a, S> {
    const KIND: StructureKind = StructureKind::HyperLogLog;

    fn insert(&self, entity: &MemberPoint) -> Result<bool> {
        self.add(entity)
    }

    /// The estimate, carried as the point of a single record
    fn read(&self, member_id: u32) -> Result<Vec<MemberPoint>> {
        Ok(vec![MemberPoint::new(member_id, self.length(member_id)?)])
    }

    fn delete(&self, member_id: u32) -> Result<bool> {
        self.access.delete_key(Self::KIND, member_id)
    }
}
