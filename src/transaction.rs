//! Transaction Coordinator
//!
//! Optimistic compare-and-set over many scalar keys: every key is written,
//! or none is.

use bytes::Bytes;
use tracing::debug;

use crate::adapters::Access;
use crate::error::Result;
use crate::keys::StructureKind;
use crate::model::MemberPoint;
use crate::protocol::Command;
use crate::store::{Condition, Connection, Store};

pub struct TransactionCoordinator<'a, S: Store> {
    access: Access<'a, S>,
}

impl<'a, S: Store> TransactionCoordinator<'a, S> {
    pub(crate) fn new(access: Access<'a, S>) -> Self {
        Self { access }
    }

    /// Set every member's scalar to `new_point` iff each currently holds
    /// the point in `expected`
    ///
    /// Returns false, with nothing written, when any value differs or is
    /// absent at commit time. An empty `expected` commits trivially.
    pub fn conditional_set(&self, expected: &[MemberPoint], new_point: i64) -> Result<bool> {
        if expected.is_empty() {
            return Ok(true);
        }

        let conditions = expected
            .iter()
            .map(|e| Condition::StringEqual {
                key: self.access.key(StructureKind::Scalar, e.member_id),
                value: e.point_value(),
            })
            .collect();
        let value = Bytes::from(new_point.to_string());
        let commands = expected
            .iter()
            .map(|e| Command::Set {
                key: self.access.key(StructureKind::Scalar, e.member_id),
                value: value.clone(),
                ttl: None,
            })
            .collect();

        let outcome = self
            .access
            .with_connection("transaction.conditional_set", |conn| conn.transaction(conditions, commands))?;

        match outcome {
            Some(replies) => {
                for reply in replies {
                    reply?;
                }
                debug!(keys = expected.len(), new_point, "conditional set committed");
                Ok(true)
            }
            None => {
                debug!(keys = expected.len(), "conditional set rejected");
                Ok(false)
            }
        }
    }
}
