//! Memory Store
//!
//! In-process implementation of the store contract, for tests, benches and
//! the demo CLI. Not a storage engine: nothing is persisted.
//!
//! ## Concurrency Model
//!
//! - One `parking_lot::Mutex<Database>` per logical database
//! - A single command, a whole pipeline entry, a whole transaction and a
//!   whole script each run under that lock, so none of them can interleave
//!   with another caller
//! - Connections are cheap handles (`Arc` + database index)
//!
//! ## Fault Injection
//! [`MemoryStore::set_offline`] and [`MemoryStore::fail_next`] make calls
//! fail with `Error::Connection`, for exercising the error contract.

mod database;
mod hyperloglog;
mod pattern;
mod value;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;

use self::database::Database;
use super::{Condition, Connection, Script, Store};
use crate::error::{Error, Result};
use crate::keys::StoreKey;
use crate::model::{parse_i64, MEMBER_ID_FIELD, POINT_FIELD};
use crate::protocol::{Command, Reply};
use crate::script::{ADD_IF_NOT_EXIST, UPDATE_IF_EXIST};

/// Logical databases a default store exposes
pub const DEFAULT_DATABASES: usize = 16;

struct Shared {
    databases: Vec<Mutex<Database>>,

    /// Every call fails while set
    offline: AtomicBool,

    /// Number of upcoming calls that fail
    pending_failures: AtomicUsize,
}

impl Shared {
    /// Consume one injected fault, if any
    fn check(&self) -> Result<()> {
        if self.offline.load(Ordering::Acquire) {
            return Err(Error::Connection("store offline".to_string()));
        }
        let took = self
            .pending_failures
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if took {
            return Err(Error::Connection("injected connection failure".to_string()));
        }
        Ok(())
    }
}

/// In-process store shared by cloning
#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("databases", &self.shared.databases.len())
            .field("offline", &self.shared.offline.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryStore {
    /// Store with the default 16 databases
    pub fn new() -> Self {
        Self::with_databases(DEFAULT_DATABASES)
    }

    /// Store with `count` databases
    pub fn with_databases(count: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                databases: (0..count).map(|_| Mutex::new(Database::new())).collect(),
                offline: AtomicBool::new(false),
                pending_failures: AtomicUsize::new(0),
            }),
        }
    }

    /// Number of logical databases
    pub fn database_count(&self) -> usize {
        self.shared.databases.len()
    }

    /// Make every call fail (true) or succeed again (false)
    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::Release);
    }

    /// Make the next `count` calls fail
    pub fn fail_next(&self, count: usize) {
        self.shared.pending_failures.store(count, Ordering::Release);
    }

    /// Drop every key in every database
    pub fn flush_all(&self) {
        for db in &self.shared.databases {
            *db.lock() = Database::new();
        }
    }
}

impl Store for MemoryStore {
    type Connection = MemoryConnection;

    fn connect(&self, database: u32) -> Result<MemoryConnection> {
        self.shared.check()?;
        let index = database as usize;
        if index >= self.shared.databases.len() {
            return Err(Error::Server(format!("DB index {} is out of range", database)));
        }
        tracing::trace!(database, "memory connection opened");
        Ok(MemoryConnection { shared: Arc::clone(&self.shared), index })
    }
}

/// Handle on one database of a [`MemoryStore`]
pub struct MemoryConnection {
    shared: Arc<Shared>,
    index: usize,
}

impl std::fmt::Debug for MemoryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConnection").field("database", &self.index).finish()
    }
}

impl MemoryConnection {
    fn database(&self) -> &Mutex<Database> {
        &self.shared.databases[self.index]
    }
}

impl Connection for MemoryConnection {
    fn execute(&mut self, command: Command) -> Result<Reply> {
        self.shared.check()?;
        tracing::trace!(command = command.name(), "execute");
        self.database().lock().apply(command)
    }

    fn pipeline(&mut self, commands: Vec<Command>) -> Result<Vec<Result<Reply>>> {
        self.shared.check()?;
        tracing::trace!(commands = commands.len(), "pipeline");
        let mut db = self.database().lock();
        Ok(commands.into_iter().map(|command| db.apply(command)).collect())
    }

    fn transaction(
        &mut self,
        conditions: Vec<Condition>,
        commands: Vec<Command>,
    ) -> Result<Option<Vec<Result<Reply>>>> {
        self.shared.check()?;
        let mut db = self.database().lock();
        if let Some(failed) = conditions.iter().find(|c| !db.holds(c)) {
            tracing::debug!(key = %failed.key(), "transaction precondition failed");
            return Ok(None);
        }
        Ok(Some(commands.into_iter().map(|command| db.apply(command)).collect()))
    }

    fn eval(&mut self, script: &Script, keys: &[StoreKey], args: &[Bytes]) -> Result<Reply> {
        self.shared.check()?;
        tracing::trace!(script = script.name, "eval");
        let mut db = self.database().lock();
        run_script(&mut db, script, keys, args)
    }
}

// =============================================================================
// Native Scripts
// =============================================================================

/// Run one of the crate's scripts natively under the database lock
fn run_script(db: &mut Database, script: &Script, keys: &[StoreKey], args: &[Bytes]) -> Result<Reply> {
    let key = keys
        .first()
        .cloned()
        .ok_or_else(|| Error::Script(format!("{}: missing KEYS[1]", script.name)))?;

    if *script == ADD_IF_NOT_EXIST {
        if db.apply(Command::Exists { key: key.clone() })?.into_bool()? {
            return Ok(Reply::Int(0));
        }
        let seconds = script_int(script, args, 2)?;
        db.apply(Command::HSet {
            key: key.clone(),
            fields: vec![
                (MEMBER_ID_FIELD.to_string(), script_arg(script, args, 0)?.clone()),
                (POINT_FIELD.to_string(), script_arg(script, args, 1)?.clone()),
            ],
        })?;
        db.apply(Command::Expire { key, ttl: Duration::from_secs(seconds.max(0) as u64) })?;
        Ok(Reply::Int(1))
    } else if *script == UPDATE_IF_EXIST {
        if !db.apply(Command::Exists { key: key.clone() })?.into_bool()? {
            return Ok(Reply::Int(0));
        }
        let delta = script_int(script, args, 0)?;
        db.apply(Command::HIncrBy { key, field: POINT_FIELD.to_string(), delta })?;
        Ok(Reply::Int(1))
    } else {
        Err(Error::Script(format!("NOSCRIPT no native procedure for '{}'", script.name)))
    }
}

fn script_arg<'a>(script: &Script, args: &'a [Bytes], index: usize) -> Result<&'a Bytes> {
    args.get(index)
        .ok_or_else(|| Error::Script(format!("{}: missing ARGV[{}]", script.name, index + 1)))
}

fn script_int(script: &Script, args: &[Bytes], index: usize) -> Result<i64> {
    parse_i64(script_arg(script, args, index)?)
        .map_err(|_| Error::Script(format!("{}: ARGV[{}] is not an integer", script.name, index + 1)))
}
