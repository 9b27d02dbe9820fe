//! Store Module
//!
//! The connection abstraction the repository talks to.
//!
//! ## Primitives
//! - single command:   `execute`
//! - pipeline:         `pipeline` (one round trip, per-command replies)
//! - transaction:      `transaction` (watched preconditions, all-or-nothing)
//! - script:           `eval` (fixed body, keys, args, one atomic step)
//!
//! ## Backends
//! - [`MemoryStore`]: in-process, for tests and development
//! - `RedisStore`: blocking Redis client (feature `redis`)

mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use memory::{MemoryConnection, MemoryStore, DEFAULT_DATABASES};
#[cfg(feature = "redis")]
pub use redis_store::{RedisConnection, RedisStore};

use bytes::Bytes;

use crate::error::Result;
use crate::keys::StoreKey;
use crate::protocol::{Command, Reply};

/// A precondition checked at transaction commit
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The string at `key` equals `value`; an absent key never matches
    StringEqual { key: StoreKey, value: Bytes },
}

impl Condition {
    pub fn key(&self) -> &StoreKey {
        match self {
            Condition::StringEqual { key, .. } => key,
        }
    }
}

/// A server-side procedure with a fixed body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Script {
    /// Stable identifier
    pub name: &'static str,

    /// Lua source evaluated by the store
    pub body: &'static str,
}

/// Factory for connection-scoped handles
pub trait Store: Send + Sync {
    type Connection: Connection;

    /// Open a handle on the logical database `database`
    fn connect(&self, database: u32) -> Result<Self::Connection>;
}

/// A connection-scoped handle on one logical database
pub trait Connection {
    /// Run one command
    fn execute(&mut self, command: Command) -> Result<Reply>;

    /// Send all commands in one round trip
    ///
    /// The outer error is a fault of the pipeline as a whole. Each inner
    /// result is the reply of the command at the same position.
    fn pipeline(&mut self, commands: Vec<Command>) -> Result<Vec<Result<Reply>>>;

    /// Apply `commands` atomically iff every condition holds at commit
    ///
    /// Returns `Ok(None)` when a condition failed and nothing was written.
    fn transaction(
        &mut self,
        conditions: Vec<Condition>,
        commands: Vec<Command>,
    ) -> Result<Option<Vec<Result<Reply>>>>;

    /// Evaluate a script as one indivisible step
    fn eval(&mut self, script: &Script, keys: &[StoreKey], args: &[Bytes]) -> Result<Reply>;
}
