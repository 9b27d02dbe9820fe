//! Batch Executor
//!
//! Many reads in one pipelined round trip. A member whose read came back
//! nil, failed, or held something that is not a point is left out of the
//! result; only a fault of the pipeline itself is an error.

use std::collections::BTreeMap;

use tracing::debug;

use crate::adapters::Access;
use crate::error::Result;
use crate::keys::StructureKind;
use crate::model::{parse_i64, POINT_FIELD};
use crate::protocol::{Command, Reply};
use crate::store::{Connection, Store};

pub struct BatchExecutor<'a, S: Store> {
    access: Access<'a, S>,
}

impl<'a, S: Store> BatchExecutor<'a, S> {
    pub(crate) fn new(access: Access<'a, S>) -> Self {
        Self { access }
    }

    /// Point of every member that has a scalar value
    pub fn batch_get(&self, member_ids: &[u32]) -> Result<BTreeMap<u32, i64>> {
        let commands = member_ids
            .iter()
            .map(|&id| Command::Get { key: self.access.key(StructureKind::Scalar, id) })
            .collect();
        self.run("batch.get", member_ids, commands)
    }

    /// Point field of every member that has a hash record
    pub fn batch_get_hash(&self, member_ids: &[u32]) -> Result<BTreeMap<u32, i64>> {
        let commands = member_ids
            .iter()
            .map(|&id| Command::HGet {
                key: self.access.key(StructureKind::Hash, id),
                field: POINT_FIELD.to_string(),
            })
            .collect();
        self.run("batch.get_hash", member_ids, commands)
    }

    fn run(&self, operation: &'static str, member_ids: &[u32], commands: Vec<Command>) -> Result<BTreeMap<u32, i64>> {
        let mut found = BTreeMap::new();
        if member_ids.is_empty() {
            return Ok(found);
        }

        let replies = self.access.with_connection(operation, |conn| conn.pipeline(commands))?;
        for (&member_id, reply) in member_ids.iter().zip(replies) {
            match reply.and_then(point_of) {
                Ok(Some(point)) => {
                    found.insert(member_id, point);
                }
                Ok(None) => {}
                Err(e) => debug!(operation, member_id, error = %e, "batch entry skipped"),
            }
        }

        debug!(operation, requested = member_ids.len(), found = found.len(), "batch complete");
        Ok(found)
    }
}

fn point_of(reply: Reply) -> Result<Option<i64>> {
    match reply.into_bytes()? {
        Some(b) => Ok(Some(parse_i64(&b)?)),
        None => Ok(None),
    }
}
