//! Redis Store
//!
//! Blocking backend over the `redis` crate. Each [`RedisStore::connect`]
//! opens a new connection and `SELECT`s the logical database.
//!
//! ## Caveats
//! - The `redis` crate fails a whole pipeline when one command is
//!   rejected. A pipeline of reads is then replayed command by command so
//!   each entry gets its own result; a pipeline containing writes returns
//!   the error instead of running its writes twice
//! - Transactions use `WATCH` + `MULTI`/`EXEC`; a write to a watched key
//!   between the check and `EXEC` aborts the commit

use bytes::Bytes;
use redis::{Cmd, ErrorKind, RedisError, Value};
use tracing::debug;

use super::{Condition, Connection, Script, Store};
use crate::error::{Error, Result};
use crate::keys::StoreKey;
use crate::protocol::{Aggregate, Command, InsertPosition, Reply};

/// Store backed by a Redis server
#[derive(Debug, Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    /// Create a store for `url` (`redis://host:port`); does not connect
    pub fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Config(format!("invalid redis url '{}': {}", url, e)))?;
        debug!(url, "redis store created");
        Ok(Self { client })
    }
}

impl Store for RedisStore {
    type Connection = RedisConnection;

    fn connect(&self, database: u32) -> Result<RedisConnection> {
        let mut conn = self.client.get_connection().map_err(map_error)?;
        redis::cmd("SELECT").arg(database).query::<()>(&mut conn).map_err(map_error)?;
        Ok(RedisConnection { conn })
    }
}

/// One Redis connection on a selected database
pub struct RedisConnection {
    conn: redis::Connection,
}

impl Connection for RedisConnection {
    fn execute(&mut self, command: Command) -> Result<Reply> {
        let value: Value = to_cmd(&command).query(&mut self.conn).map_err(map_error)?;
        Ok(to_reply(value))
    }

    fn pipeline(&mut self, commands: Vec<Command>) -> Result<Vec<Result<Reply>>> {
        let mut pipe = redis::pipe();
        for command in &commands {
            pipe.add_command(to_cmd(command));
        }
        let rejected = match pipe.query::<Vec<Value>>(&mut self.conn) {
            Ok(values) => return Ok(values.into_iter().map(|v| Ok(to_reply(v))).collect()),
            Err(e) => map_error(e),
        };
        if rejected.is_connection() || !commands.iter().all(is_read_only) {
            return Err(rejected);
        }

        debug!(error = %rejected, commands = commands.len(), "pipeline entry rejected, replaying one by one");
        let mut replies = Vec::with_capacity(commands.len());
        for command in &commands {
            match self.execute(command.clone()) {
                Err(e) if e.is_connection() => return Err(e),
                reply => replies.push(reply),
            }
        }
        Ok(replies)
    }

    fn transaction(
        &mut self,
        conditions: Vec<Condition>,
        commands: Vec<Command>,
    ) -> Result<Option<Vec<Result<Reply>>>> {
        let watched: Vec<&str> = conditions.iter().map(|c| c.key().as_str()).collect();
        if !watched.is_empty() {
            redis::cmd("WATCH").arg(&watched).query::<()>(&mut self.conn).map_err(map_error)?;
        }

        for condition in &conditions {
            if !self.holds(condition)? {
                redis::cmd("UNWATCH").query::<()>(&mut self.conn).map_err(map_error)?;
                debug!(key = %condition.key(), "transaction precondition failed");
                return Ok(None);
            }
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for command in &commands {
            pipe.add_command(to_cmd(command));
        }
        let committed: Option<Vec<Value>> = pipe.query(&mut self.conn).map_err(map_error)?;
        if committed.is_none() {
            debug!("transaction aborted by a concurrent write");
        }
        Ok(committed.map(|values| values.into_iter().map(|v| Ok(to_reply(v))).collect()))
    }

    fn eval(&mut self, script: &Script, keys: &[StoreKey], args: &[Bytes]) -> Result<Reply> {
        let lua = redis::Script::new(script.body);
        let mut invocation = lua.prepare_invoke();
        for key in keys {
            invocation.key(key.as_str());
        }
        for arg in args {
            invocation.arg(&arg[..]);
        }
        let value: Value = invocation.invoke(&mut self.conn).map_err(|e| match map_error(e) {
            Error::Server(msg) => Error::Script(format!("{}: {}", script.name, msg)),
            other => other,
        })?;
        Ok(to_reply(value))
    }
}

/// Commands that can be replayed after a rejected pipeline
fn is_read_only(command: &Command) -> bool {
    matches!(
        command,
        Command::Exists { .. }
            | Command::Get { .. }
            | Command::MGet { .. }
            | Command::HGet { .. }
            | Command::HGetAll { .. }
            | Command::LIndex { .. }
            | Command::LRange { .. }
            | Command::LLen { .. }
            | Command::SIsMember { .. }
            | Command::SMembers { .. }
            | Command::ZCard { .. }
            | Command::ZRange { .. }
            | Command::ZRank { .. }
            | Command::ZScore { .. }
    )
}

impl RedisConnection {
    fn holds(&mut self, condition: &Condition) -> Result<bool> {
        match condition {
            Condition::StringEqual { key, value } => {
                let current: redis::RedisResult<Option<Vec<u8>>> =
                    redis::cmd("GET").arg(key.as_str()).query(&mut self.conn);
                match current {
                    Ok(current) => Ok(current.as_deref() == Some(&value[..])),
                    Err(e) if e.code() == Some("WRONGTYPE") => Ok(false),
                    Err(e) => Err(map_error(e)),
                }
            }
        }
    }
}

// =============================================================================
// Translation
// =============================================================================

fn to_cmd(command: &Command) -> Cmd {
    let mut cmd = redis::cmd(command.name());
    match command {
        Command::Exists { key } | Command::Del { key } | Command::Get { key } => {
            cmd.arg(key.as_str());
        }
        Command::Expire { key, ttl } => {
            cmd.arg(key.as_str()).arg(ttl.as_millis() as u64);
        }
        Command::MGet { keys } => {
            cmd.arg(key_args(keys));
        }
        Command::Set { key, value, ttl } => {
            cmd.arg(key.as_str()).arg(&value[..]);
            if let Some(ttl) = ttl {
                cmd.arg("PX").arg(ttl.as_millis() as u64);
            }
        }
        Command::IncrBy { key, delta } => {
            cmd.arg(key.as_str()).arg(*delta);
        }
        Command::HSet { key, fields } => {
            cmd.arg(key.as_str());
            for (field, value) in fields {
                cmd.arg(field.as_str()).arg(&value[..]);
            }
        }
        Command::HGet { key, field } => {
            cmd.arg(key.as_str()).arg(field.as_str());
        }
        Command::HGetAll { key } => {
            cmd.arg(key.as_str());
        }
        Command::HIncrBy { key, field, delta } => {
            cmd.arg(key.as_str()).arg(field.as_str()).arg(*delta);
        }
        Command::LPush { key, values } | Command::RPush { key, values } => {
            cmd.arg(key.as_str());
            for value in values {
                cmd.arg(&value[..]);
            }
        }
        Command::LPop { key } | Command::RPop { key } | Command::LLen { key } => {
            cmd.arg(key.as_str());
        }
        Command::LIndex { key, index } => {
            cmd.arg(key.as_str()).arg(*index);
        }
        Command::LInsert { key, position, pivot, value } => {
            let position = match position {
                InsertPosition::Before => "BEFORE",
                InsertPosition::After => "AFTER",
            };
            cmd.arg(key.as_str()).arg(position).arg(&pivot[..]).arg(&value[..]);
        }
        Command::LRange { key, start, stop } => {
            cmd.arg(key.as_str()).arg(*start).arg(*stop);
        }
        Command::LRem { key, count, value } => {
            cmd.arg(key.as_str()).arg(*count).arg(&value[..]);
        }
        Command::RPopLPush { source, destination } => {
            cmd.arg(source.as_str()).arg(destination.as_str());
        }
        Command::SAdd { key, members } | Command::SRem { key, members } | Command::ZRem { key, members } => {
            cmd.arg(key.as_str());
            for member in members {
                cmd.arg(&member[..]);
            }
        }
        Command::SIsMember { key, member } | Command::ZRank { key, member } | Command::ZScore { key, member } => {
            cmd.arg(key.as_str()).arg(&member[..]);
        }
        Command::SMembers { key } | Command::ZCard { key } => {
            cmd.arg(key.as_str());
        }
        Command::SMove { source, destination, member } => {
            cmd.arg(source.as_str()).arg(destination.as_str()).arg(&member[..]);
        }
        Command::SPop { key, count } => {
            cmd.arg(key.as_str());
            if let Some(count) = count {
                cmd.arg(*count);
            }
        }
        Command::SRandMember { key, count } => {
            cmd.arg(key.as_str());
            if let Some(count) = count {
                cmd.arg(*count);
            }
        }
        Command::SCombine { keys, .. } => {
            cmd.arg(key_args(keys));
        }
        Command::SCombineStore { destination, keys, .. } => {
            cmd.arg(destination.as_str()).arg(key_args(keys));
        }
        Command::SScan { key, cursor, pattern, count } | Command::ZScan { key, cursor, pattern, count } => {
            cmd.arg(key.as_str()).arg(*cursor);
            if let Some(pattern) = pattern {
                cmd.arg("MATCH").arg(pattern.as_str());
            }
            if let Some(count) = count {
                cmd.arg("COUNT").arg(*count);
            }
        }
        Command::ZAdd { key, members } => {
            cmd.arg(key.as_str());
            for (score, member) in members {
                cmd.arg(score_arg(*score)).arg(&member[..]);
            }
        }
        Command::ZIncrBy { key, delta, member } => {
            cmd.arg(key.as_str()).arg(score_arg(*delta)).arg(&member[..]);
        }
        Command::ZLexCount { key, min, max }
        | Command::ZRangeByLex { key, min, max }
        | Command::ZRemRangeByLex { key, min, max } => {
            cmd.arg(key.as_str()).arg(min.to_arg(true)).arg(max.to_arg(false));
        }
        Command::ZPopMin { key, count } => {
            cmd.arg(key.as_str());
            if let Some(count) = count {
                cmd.arg(*count);
            }
        }
        Command::ZRange { key, start, stop, with_scores } => {
            cmd.arg(key.as_str()).arg(*start).arg(*stop);
            if *with_scores {
                cmd.arg("WITHSCORES");
            }
        }
        Command::ZRangeByScore { key, min, max, with_scores } => {
            cmd.arg(key.as_str()).arg(score_arg(*min)).arg(score_arg(*max));
            if *with_scores {
                cmd.arg("WITHSCORES");
            }
        }
        Command::ZRemRangeByRank { key, start, stop } => {
            cmd.arg(key.as_str()).arg(*start).arg(*stop);
        }
        Command::ZRemRangeByScore { key, min, max } => {
            cmd.arg(key.as_str()).arg(score_arg(*min)).arg(score_arg(*max));
        }
        Command::ZCombineStore { destination, keys, aggregate, .. } => {
            cmd.arg(destination.as_str()).arg(keys.len()).arg(key_args(keys));
            cmd.arg("AGGREGATE").arg(match aggregate {
                Aggregate::Sum => "SUM",
                Aggregate::Min => "MIN",
                Aggregate::Max => "MAX",
            });
        }
        Command::PfAdd { key, elements } => {
            cmd.arg(key.as_str());
            for element in elements {
                cmd.arg(&element[..]);
            }
        }
        Command::PfCount { keys } => {
            cmd.arg(key_args(keys));
        }
        Command::PfMerge { destination, sources } => {
            cmd.arg(destination.as_str()).arg(key_args(sources));
        }
    }
    cmd
}

fn key_args(keys: &[StoreKey]) -> Vec<&str> {
    keys.iter().map(StoreKey::as_str).collect()
}

/// Score in the server's notation, including `+inf` / `-inf`
fn score_arg(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    }
}

fn to_reply(value: Value) -> Reply {
    match value {
        Value::Nil => Reply::Nil,
        Value::Int(n) => Reply::Int(n),
        Value::Data(bytes) => Reply::Bulk(Bytes::from(bytes)),
        Value::Bulk(items) => Reply::Array(items.into_iter().map(to_reply).collect()),
        Value::Status(_) | Value::Okay => Reply::Ok,
    }
}

fn map_error(e: RedisError) -> Error {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
        Error::Connection(e.to_string())
    } else if e.code() == Some("WRONGTYPE") {
        Error::WrongType
    } else if e.kind() == ErrorKind::NoScriptError {
        Error::Script(e.to_string())
    } else {
        Error::Server(e.to_string())
    }
}
