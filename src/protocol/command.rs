//! Command definitions
//!
//! One variant per store command the adapters issue.

use std::time::Duration;

use bytes::Bytes;

use crate::keys::StoreKey;

/// Set algebra for `SINTER` / `SUNION` / `SDIFF`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Intersect,
    Union,
    Difference,
}

/// Sorted-set algebra. There is no difference operator for sorted sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortedSetOp {
    Intersect,
    Union,
}

/// Score aggregation for sorted-set combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregate {
    #[default]
    Sum,
    Min,
    Max,
}

/// Where `LINSERT` places the new element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

/// One end of a lexicographic range (`ZRANGEBYLEX`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexBound {
    Unbounded,
    Inclusive(Bytes),
    Exclusive(Bytes),
}

impl LexBound {
    pub fn inclusive(value: impl Into<String>) -> Self {
        LexBound::Inclusive(Bytes::from(value.into()))
    }

    pub fn exclusive(value: impl Into<String>) -> Self {
        LexBound::Exclusive(Bytes::from(value.into()))
    }

    /// Wire form: `-`, `+`, `[value` or `(value`
    pub fn to_arg(&self, is_min: bool) -> Vec<u8> {
        match self {
            LexBound::Unbounded => if is_min { b"-".to_vec() } else { b"+".to_vec() },
            LexBound::Inclusive(v) => [b"[".as_slice(), v.as_ref()].concat(),
            LexBound::Exclusive(v) => [b"(".as_slice(), v.as_ref()].concat(),
        }
    }
}

/// A store command
#[derive(Debug, Clone)]
pub enum Command {
    // -------------------------------------------------------------------------
    // Keys
    // -------------------------------------------------------------------------
    Exists { key: StoreKey },
    Del { key: StoreKey },
    Expire { key: StoreKey, ttl: Duration },

    // -------------------------------------------------------------------------
    // Strings
    // -------------------------------------------------------------------------
    Get { key: StoreKey },
    MGet { keys: Vec<StoreKey> },
    Set { key: StoreKey, value: Bytes, ttl: Option<Duration> },
    IncrBy { key: StoreKey, delta: i64 },

    // -------------------------------------------------------------------------
    // Hashes
    // -------------------------------------------------------------------------
    HSet { key: StoreKey, fields: Vec<(String, Bytes)> },
    HGet { key: StoreKey, field: String },
    HGetAll { key: StoreKey },
    HIncrBy { key: StoreKey, field: String, delta: i64 },

    // -------------------------------------------------------------------------
    // Lists
    // -------------------------------------------------------------------------
    LPush { key: StoreKey, values: Vec<Bytes> },
    RPush { key: StoreKey, values: Vec<Bytes> },
    LPop { key: StoreKey },
    RPop { key: StoreKey },
    LIndex { key: StoreKey, index: i64 },
    LInsert { key: StoreKey, position: InsertPosition, pivot: Bytes, value: Bytes },
    LRange { key: StoreKey, start: i64, stop: i64 },
    LRem { key: StoreKey, count: i64, value: Bytes },
    LLen { key: StoreKey },
    RPopLPush { source: StoreKey, destination: StoreKey },

    // -------------------------------------------------------------------------
    // Sets
    // -------------------------------------------------------------------------
    SAdd { key: StoreKey, members: Vec<Bytes> },
    SRem { key: StoreKey, members: Vec<Bytes> },
    SIsMember { key: StoreKey, member: Bytes },
    SMembers { key: StoreKey },
    SMove { source: StoreKey, destination: StoreKey, member: Bytes },
    SPop { key: StoreKey, count: Option<u64> },
    SRandMember { key: StoreKey, count: Option<i64> },
    SCombine { op: SetOp, keys: Vec<StoreKey> },
    SCombineStore { op: SetOp, destination: StoreKey, keys: Vec<StoreKey> },
    SScan { key: StoreKey, cursor: u64, pattern: Option<String>, count: Option<usize> },

    // -------------------------------------------------------------------------
    // Sorted Sets
    // -------------------------------------------------------------------------
    ZAdd { key: StoreKey, members: Vec<(f64, Bytes)> },
    ZIncrBy { key: StoreKey, delta: f64, member: Bytes },
    ZCard { key: StoreKey },
    ZLexCount { key: StoreKey, min: LexBound, max: LexBound },
    ZPopMin { key: StoreKey, count: Option<u64> },
    ZRange { key: StoreKey, start: i64, stop: i64, with_scores: bool },
    ZRangeByScore { key: StoreKey, min: f64, max: f64, with_scores: bool },
    ZRangeByLex { key: StoreKey, min: LexBound, max: LexBound },
    ZRank { key: StoreKey, member: Bytes },
    ZScore { key: StoreKey, member: Bytes },
    ZRem { key: StoreKey, members: Vec<Bytes> },
    ZRemRangeByRank { key: StoreKey, start: i64, stop: i64 },
    ZRemRangeByScore { key: StoreKey, min: f64, max: f64 },
    ZRemRangeByLex { key: StoreKey, min: LexBound, max: LexBound },
    ZScan { key: StoreKey, cursor: u64, pattern: Option<String>, count: Option<usize> },
    ZCombineStore {
        op: SortedSetOp,
        destination: StoreKey,
        keys: Vec<StoreKey>,
        aggregate: Aggregate,
    },

    // -------------------------------------------------------------------------
    // HyperLogLog
    // -------------------------------------------------------------------------
    PfAdd { key: StoreKey, elements: Vec<Bytes> },
    PfCount { keys: Vec<StoreKey> },
    PfMerge { destination: StoreKey, sources: Vec<StoreKey> },
}

impl Command {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::Exists { .. } => "EXISTS",
            Command::Del { .. } => "DEL",
            Command::Expire { .. } => "PEXPIRE",
            Command::Get { .. } => "GET",
            Command::MGet { .. } => "MGET",
            Command::Set { .. } => "SET",
            Command::IncrBy { .. } => "INCRBY",
            Command::HSet { .. } => "HSET",
            Command::HGet { .. } => "HGET",
            Command::HGetAll { .. } => "HGETALL",
            Command::HIncrBy { .. } => "HINCRBY",
            Command::LPush { .. } => "LPUSH",
            Command::RPush { .. } => "RPUSH",
            Command::LPop { .. } => "LPOP",
            Command::RPop { .. } => "RPOP",
            Command::LIndex { .. } => "LINDEX",
            Command::LInsert { .. } => "LINSERT",
            Command::LRange { .. } => "LRANGE",
            Command::LRem { .. } => "LREM",
            Command::LLen { .. } => "LLEN",
            Command::RPopLPush { .. } => "RPOPLPUSH",
            Command::SAdd { .. } => "SADD",
            Command::SRem { .. } => "SREM",
            Command::SIsMember { .. } => "SISMEMBER",
            Command::SMembers { .. } => "SMEMBERS",
            Command::SMove { .. } => "SMOVE",
            Command::SPop { .. } => "SPOP",
            Command::SRandMember { .. } => "SRANDMEMBER",
            Command::SCombine { op, .. } => match op {
                SetOp::Intersect => "SINTER",
                SetOp::Union => "SUNION",
                SetOp::Difference => "SDIFF",
            },
            Command::SCombineStore { op, .. } => match op {
                SetOp::Intersect => "SINTERSTORE",
                SetOp::Union => "SUNIONSTORE",
                SetOp::Difference => "SDIFFSTORE",
            },
            Command::SScan { .. } => "SSCAN",
            Command::ZAdd { .. } => "ZADD",
            Command::ZIncrBy { .. } => "ZINCRBY",
            Command::ZCard { .. } => "ZCARD",
            Command::ZLexCount { .. } => "ZLEXCOUNT",
            Command::ZPopMin { .. } => "ZPOPMIN",
            Command::ZRange { .. } => "ZRANGE",
            Command::ZRangeByScore { .. } => "ZRANGEBYSCORE",
            Command::ZRangeByLex { .. } => "ZRANGEBYLEX",
            Command::ZRank { .. } => "ZRANK",
            Command::ZScore { .. } => "ZSCORE",
            Command::ZRem { .. } => "ZREM",
            Command::ZRemRangeByRank { .. } => "ZREMRANGEBYRANK",
            Command::ZRemRangeByScore { .. } => "ZREMRANGEBYSCORE",
            Command::ZRemRangeByLex { .. } => "ZREMRANGEBYLEX",
            Command::ZScan { .. } => "ZSCAN",
            Command::ZCombineStore { op, .. } => match op {
                SortedSetOp::Intersect => "ZINTERSTORE",
                SortedSetOp::Union => "ZUNIONSTORE",
            },
            Command::PfAdd { .. } => "PFADD",
            Command::PfCount { .. } => "PFCOUNT",
            Command::PfMerge { .. } => "PFMERGE",
        }
    }
}
