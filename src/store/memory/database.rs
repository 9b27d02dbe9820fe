//! One logical database of the memory store
//!
//! Applies a single [`Command`] to the keyspace. Callers hold the database
//! lock for the whole command, pipeline entry, transaction or script, which
//! is what makes each of those atomic.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::time::Instant;

use bytes::Bytes;
use rand::seq::IteratorRandom;
use rand::Rng;

use super::hyperloglog::HyperLogLog;
use super::pattern::glob_match;
use super::value::{format_score, Entry, SortedSet, Value};
use crate::error::{Error, Result};
use crate::keys::StoreKey;
use crate::model::parse_i64;
use crate::protocol::{Aggregate, Command, InsertPosition, LexBound, Reply, SetOp, SortedSetOp};
use crate::store::Condition;

/// Default COUNT hint for scans
const DEFAULT_SCAN_COUNT: usize = 10;

const NOT_AN_INTEGER: &str = "value is not an integer or out of range";
const INVALID_SET_EXPIRE: &str = "invalid expire time in 'set' command";

/// Typed accessors: `$get` returns the value if present, `$create` creates
/// an empty one when absent. Both fail with `WrongType` for other kinds.
macro_rules! typed_access {
    ($get:ident, $create:ident, $variant:ident, $ty:ty) => {
        fn $get(&mut self, key: &StoreKey) -> Result<Option<&mut $ty>> {
            match self.live(key) {
                None => Ok(None),
                Some(Entry { value: Value::$variant(v), .. }) => Ok(Some(v)),
                Some(_) => Err(Error::WrongType),
            }
        }

        fn $create(&mut self, key: &StoreKey) -> Result<&mut $ty> {
            self.purge(key);
            let entry = self
                .entries
                .entry(key.as_str().to_string())
                .or_insert_with(|| Entry::new(Value::$variant(Default::default())));
            match &mut entry.value {
                Value::$variant(v) => Ok(v),
                _ => Err(Error::WrongType),
            }
        }
    };
}

/// Keyspace of one logical database
#[derive(Debug, Default)]
pub(super) struct Database {
    entries: HashMap<String, Entry>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Entry Lookup
    // =========================================================================

    /// Drop the entry if its expiry has passed
    fn purge(&mut self, key: &StoreKey) {
        let now = Instant::now();
        if self.entries.get(key.as_str()).map_or(false, |e| e.is_expired(now)) {
            self.entries.remove(key.as_str());
        }
    }

    fn live(&mut self, key: &StoreKey) -> Option<&mut Entry> {
        self.purge(key);
        self.entries.get_mut(key.as_str())
    }

    fn exists(&mut self, key: &StoreKey) -> bool {
        self.live(key).is_some()
    }

    /// Remove a collection whose last element was taken
    fn drop_if_empty(&mut self, key: &StoreKey) {
        if self.entries.get(key.as_str()).map_or(false, |e| e.value.is_empty_collection()) {
            self.entries.remove(key.as_str());
        }
    }

    /// Fail with `WrongType` if `key` holds something other than `expected`
    fn expect_kind(&mut self, key: &StoreKey, expected: fn(&Value) -> bool) -> Result<()> {
        match self.live(key) {
            Some(entry) if !expected(&entry.value) => Err(Error::WrongType),
            _ => Ok(()),
        }
    }

    typed_access!(string, string_or_default, Str, Bytes);
    typed_access!(hash, hash_or_create, Hash, BTreeMap<String, Bytes>);
    typed_access!(list, list_or_create, List, VecDeque<Bytes>);
    typed_access!(set, set_or_create, Set, BTreeSet<Bytes>);
    typed_access!(zset, zset_or_create, ZSet, SortedSet);

    fn hll(&mut self, key: &StoreKey) -> Result<Option<&mut HyperLogLog>> {
        match self.live(key) {
            None => Ok(None),
            Some(Entry { value: Value::Hll(h), .. }) => Ok(Some(h.as_mut())),
            Some(_) => Err(Error::WrongType),
        }
    }

    /// Snapshot of a set; absent keys read as empty
    fn set_snapshot(&mut self, key: &StoreKey) -> Result<BTreeSet<Bytes>> {
        Ok(self.set(key)?.cloned().unwrap_or_default())
    }

    /// Replace whatever is at `key`; empty collections delete it
    fn store(&mut self, key: &StoreKey, value: Value) {
        if value.is_empty_collection() {
            self.entries.remove(key.as_str());
        } else {
            self.entries.insert(key.as_str().to_string(), Entry::new(value));
        }
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Evaluate a commit precondition
    pub fn holds(&mut self, condition: &Condition) -> bool {
        match condition {
            Condition::StringEqual { key, value } => {
                matches!(self.string(key), Ok(Some(current)) if *current == *value)
            }
        }
    }

    // =========================================================================
    // Command Router
    // =========================================================================

    /// Apply one command
    pub fn apply(&mut self, command: Command) -> Result<Reply> {
        match command {
            // -----------------------------------------------------------------
            // Keys
            // -----------------------------------------------------------------
            Command::Exists { key } => Ok(Reply::Int(self.exists(&key) as i64)),
            Command::Del { key } => {
                let existed = self.exists(&key);
                self.entries.remove(key.as_str());
                Ok(Reply::Int(existed as i64))
            }
            Command::Expire { key, ttl } => {
                if !self.exists(&key) {
                    return Ok(Reply::Int(0));
                }
                if ttl.is_zero() {
                    self.entries.remove(key.as_str());
                } else if let Some(entry) = self.entries.get_mut(key.as_str()) {
                    entry.expires_at = Some(Instant::now() + ttl);
                }
                Ok(Reply::Int(1))
            }

            // -----------------------------------------------------------------
            // Strings
            // -----------------------------------------------------------------
            Command::Get { key } => Ok(match self.string(&key)? {
                Some(v) => Reply::Bulk(v.clone()),
                None => Reply::Nil,
            }),
            Command::MGet { keys } => {
                let values = keys
                    .iter()
                    .map(|key| match self.string(key) {
                        Ok(Some(v)) => Reply::Bulk(v.clone()),
                        _ => Reply::Nil,
                    })
                    .collect();
                Ok(Reply::Array(values))
            }
            Command::Set { key, value, ttl } => {
                if ttl.is_some_and(|ttl| ttl.is_zero()) {
                    return Err(Error::Server(INVALID_SET_EXPIRE.to_string()));
                }
                let mut entry = Entry::new(Value::Str(value));
                entry.expires_at = ttl.map(|ttl| Instant::now() + ttl);
                self.entries.insert(key.into_string(), entry);
                Ok(Reply::Ok)
            }
            Command::IncrBy { key, delta } => {
                let current = match self.string(&key)? {
                    Some(v) => parse_i64(v).map_err(|_| Error::Server(NOT_AN_INTEGER.to_string()))?,
                    None => 0,
                };
                let next = current.checked_add(delta).ok_or_else(|| {
                    Error::Server("increment or decrement would overflow".to_string())
                })?;
                // INCRBY keeps the existing expiry
                *self.string_or_default(&key)? = Bytes::from(next.to_string());
                Ok(Reply::Int(next))
            }

            // -----------------------------------------------------------------
            // Hashes
            // -----------------------------------------------------------------
            Command::HSet { key, fields } => {
                let hash = self.hash_or_create(&key)?;
                let added = fields
                    .into_iter()
                    .filter(|(field, value)| hash.insert(field.clone(), value.clone()).is_none())
                    .count();
                Ok(Reply::Int(added as i64))
            }
            Command::HGet { key, field } => Ok(match self.hash(&key)?.and_then(|h| h.get(&field)) {
                Some(v) => Reply::Bulk(v.clone()),
                None => Reply::Nil,
            }),
            Command::HGetAll { key } => {
                let mut flat = Vec::new();
                if let Some(hash) = self.hash(&key)? {
                    for (field, value) in hash.iter() {
                        flat.push(Reply::bulk(field.clone()));
                        flat.push(Reply::Bulk(value.clone()));
                    }
                }
                Ok(Reply::Array(flat))
            }
            Command::HIncrBy { key, field, delta } => {
                let hash = self.hash_or_create(&key)?;
                let current = match hash.get(&field) {
                    Some(v) => parse_i64(v)
                        .map_err(|_| Error::Server("hash value is not an integer".to_string()))?,
                    None => 0,
                };
                let next = current.checked_add(delta).ok_or_else(|| {
                    Error::Server("increment or decrement would overflow".to_string())
                })?;
                hash.insert(field, Bytes::from(next.to_string()));
                Ok(Reply::Int(next))
            }

            // -----------------------------------------------------------------
            // Lists
            // -----------------------------------------------------------------
            Command::LPush { values, .. } | Command::RPush { values, .. } if values.is_empty() => {
                Err(Error::Server("wrong number of arguments for push".to_string()))
            }
            Command::LPush { key, values } => {
                let list = self.list_or_create(&key)?;
                for value in values {
                    list.push_front(value);
                }
                Ok(Reply::Int(list.len() as i64))
            }
            Command::RPush { key, values } => {
                let list = self.list_or_create(&key)?;
                list.extend(values);
                Ok(Reply::Int(list.len() as i64))
            }
            Command::LPop { key } => {
                let popped = self.list(&key)?.and_then(|l| l.pop_front());
                self.drop_if_empty(&key);
                Ok(popped.map_or(Reply::Nil, Reply::Bulk))
            }
            Command::RPop { key } => {
                let popped = self.list(&key)?.and_then(|l| l.pop_back());
                self.drop_if_empty(&key);
                Ok(popped.map_or(Reply::Nil, Reply::Bulk))
            }
            Command::LIndex { key, index } => {
                let value = self.list(&key)?.and_then(|list| {
                    let len = list.len() as i64;
                    let at = if index < 0 { len + index } else { index };
                    if (0..len).contains(&at) {
                        list.get(at as usize).cloned()
                    } else {
                        None
                    }
                });
                Ok(value.map_or(Reply::Nil, Reply::Bulk))
            }
            Command::LInsert { key, position, pivot, value } => {
                let Some(list) = self.list(&key)? else {
                    return Ok(Reply::Int(0));
                };
                match list.iter().position(|v| *v == pivot) {
                    Some(at) => {
                        let at = match position {
                            InsertPosition::Before => at,
                            InsertPosition::After => at + 1,
                        };
                        list.insert(at, value);
                        Ok(Reply::Int(list.len() as i64))
                    }
                    None => Ok(Reply::Int(-1)),
                }
            }
            Command::LRange { key, start, stop } => {
                let items = match self.list(&key)? {
                    Some(list) => match normalize_range(start, stop, list.len()) {
                        Some((from, to)) => list.range(from..=to).cloned().collect(),
                        None => Vec::new(),
                    },
                    None => Vec::new(),
                };
                Ok(Reply::bulks(items))
            }
            Command::LRem { key, count, value } => {
                let Some(list) = self.list(&key)? else {
                    return Ok(Reply::Int(0));
                };
                let removed = remove_occurrences(list, &value, count);
                self.drop_if_empty(&key);
                Ok(Reply::Int(removed as i64))
            }
            Command::LLen { key } => Ok(Reply::Int(self.list(&key)?.map_or(0, |l| l.len()) as i64)),
            Command::RPopLPush { source, destination } => {
                self.expect_kind(&destination, |v| matches!(v, Value::List(_)))?;
                let Some(value) = self.list(&source)?.and_then(|l| l.pop_back()) else {
                    return Ok(Reply::Nil);
                };
                self.drop_if_empty(&source);
                self.list_or_create(&destination)?.push_front(value.clone());
                Ok(Reply::Bulk(value))
            }

            // -----------------------------------------------------------------
            // Sets
            // -----------------------------------------------------------------
            Command::SAdd { key, members } => {
                let set = self.set_or_create(&key)?;
                let added = members.into_iter().filter(|m| set.insert(m.clone())).count();
                self.drop_if_empty(&key);
                Ok(Reply::Int(added as i64))
            }
            Command::SRem { key, members } => {
                let Some(set) = self.set(&key)? else {
                    return Ok(Reply::Int(0));
                };
                let removed = members.iter().filter(|m| set.remove(*m)).count();
                self.drop_if_empty(&key);
                Ok(Reply::Int(removed as i64))
            }
            Command::SIsMember { key, member } => {
                Ok(Reply::Int(self.set(&key)?.map_or(false, |s| s.contains(&member)) as i64))
            }
            Command::SMembers { key } => Ok(Reply::bulks(self.set_snapshot(&key)?)),
            Command::SMove { source, destination, member } => {
                self.expect_kind(&destination, |v| matches!(v, Value::Set(_)))?;
                let moved = self.set(&source)?.map_or(false, |s| s.remove(&member));
                if !moved {
                    return Ok(Reply::Int(0));
                }
                self.drop_if_empty(&source);
                self.set_or_create(&destination)?.insert(member);
                Ok(Reply::Int(1))
            }
            Command::SPop { key, count } => {
                let Some(set) = self.set(&key)? else {
                    return Ok(if count.is_some() { Reply::Array(Vec::new()) } else { Reply::Nil });
                };
                let mut rng = rand::thread_rng();
                let take = count.unwrap_or(1) as usize;
                let chosen: Vec<Bytes> = set.iter().cloned().choose_multiple(&mut rng, take);
                for member in &chosen {
                    set.remove(member);
                }
                self.drop_if_empty(&key);
                Ok(match count {
                    Some(_) => Reply::bulks(chosen),
                    None => chosen.into_iter().next().map_or(Reply::Nil, Reply::Bulk),
                })
            }
            Command::SRandMember { key, count } => {
                let members: Vec<Bytes> = self.set_snapshot(&key)?.into_iter().collect();
                let mut rng = rand::thread_rng();
                Ok(match count {
                    None => members.into_iter().choose(&mut rng).map_or(Reply::Nil, Reply::Bulk),
                    Some(n) if n >= 0 => {
                        Reply::bulks(members.into_iter().choose_multiple(&mut rng, n as usize))
                    }
                    // Negative count: |n| picks with repetition
                    Some(n) => {
                        if members.is_empty() {
                            Reply::Array(Vec::new())
                        } else {
                            Reply::bulks(
                                (0..n.unsigned_abs())
                                    .map(|_| members[rng.gen_range(0..members.len())].clone())
                                    .collect::<Vec<_>>(),
                            )
                        }
                    }
                })
            }
            Command::SCombine { op, keys } => Ok(Reply::bulks(self.combine_sets(op, &keys)?)),
            Command::SCombineStore { op, destination, keys } => {
                let combined = self.combine_sets(op, &keys)?;
                let len = combined.len();
                self.store(&destination, Value::Set(combined));
                Ok(Reply::Int(len as i64))
            }
            Command::SScan { key, cursor, pattern, count } => {
                let members: Vec<Bytes> = self.set_snapshot(&key)?.into_iter().collect();
                let (next, window) = scan_window(&members, cursor, count);
                let items: Vec<Bytes> = window
                    .iter()
                    .filter(|m| pattern.as_deref().map_or(true, |p| glob_match(p.as_bytes(), m)))
                    .cloned()
                    .collect();
                Ok(Reply::Array(vec![Reply::bulk(next.to_string()), Reply::bulks(items)]))
            }

            // -----------------------------------------------------------------
            // Sorted Sets
            // -----------------------------------------------------------------
            Command::ZAdd { key, members } => {
                let zset = self.zset_or_create(&key)?;
                let mut added = 0;
                for (score, member) in members {
                    if zset.insert(member, score)? {
                        added += 1;
                    }
                }
                self.drop_if_empty(&key);
                Ok(Reply::Int(added))
            }
            Command::ZIncrBy { key, delta, member } => {
                let score = self.zset_or_create(&key)?.increment(member, delta);
                self.drop_if_empty(&key);
                Ok(Reply::Bulk(format_score(score?)))
            }
            Command::ZCard { key } => Ok(Reply::Int(self.zset(&key)?.map_or(0, |z| z.len()) as i64)),
            Command::ZLexCount { key, min, max } => {
                let count = self
                    .zset(&key)?
                    .map_or(0, |z| z.iter().filter(|(m, _)| in_lex_range(m, &min, &max)).count());
                Ok(Reply::Int(count as i64))
            }
            Command::ZPopMin { key, count } => {
                let Some(zset) = self.zset(&key)? else {
                    return Ok(Reply::Array(Vec::new()));
                };
                let mut flat = Vec::new();
                for _ in 0..count.unwrap_or(1) {
                    match zset.pop_min() {
                        Some((member, score)) => push_scored(&mut flat, member, score, true),
                        None => break,
                    }
                }
                self.drop_if_empty(&key);
                Ok(Reply::Array(flat))
            }
            Command::ZRange { key, start, stop, with_scores } => {
                let mut flat = Vec::new();
                if let Some(zset) = self.zset(&key)? {
                    if let Some((from, to)) = normalize_range(start, stop, zset.len()) {
                        for (member, score) in zset.iter().skip(from).take(to - from + 1) {
                            push_scored(&mut flat, member.clone(), score, with_scores);
                        }
                    }
                }
                Ok(Reply::Array(flat))
            }
            Command::ZRangeByScore { key, min, max, with_scores } => {
                let mut flat = Vec::new();
                if let Some(zset) = self.zset(&key)? {
                    for (member, score) in zset.iter().filter(|(_, s)| *s >= min && *s <= max) {
                        push_scored(&mut flat, member.clone(), score, with_scores);
                    }
                }
                Ok(Reply::Array(flat))
            }
            Command::ZRangeByLex { key, min, max } => {
                let members: Vec<Bytes> = self.zset(&key)?.map_or_else(Vec::new, |z| {
                    z.iter()
                        .filter(|(m, _)| in_lex_range(m, &min, &max))
                        .map(|(m, _)| m.clone())
                        .collect()
                });
                Ok(Reply::bulks(members))
            }
            Command::ZRank { key, member } => Ok(match self.zset(&key)?.and_then(|z| z.rank(&member)) {
                Some(rank) => Reply::Int(rank as i64),
                None => Reply::Nil,
            }),
            Command::ZScore { key, member } => Ok(match self.zset(&key)?.and_then(|z| z.score(&member)) {
                Some(score) => Reply::Bulk(format_score(score)),
                None => Reply::Nil,
            }),
            Command::ZRem { key, members } => {
                let Some(zset) = self.zset(&key)? else {
                    return Ok(Reply::Int(0));
                };
                let removed = members.iter().filter(|m| zset.remove(m)).count();
                self.drop_if_empty(&key);
                Ok(Reply::Int(removed as i64))
            }
            Command::ZRemRangeByRank { key, start, stop } => {
                let doomed: Vec<Bytes> = self.zset(&key)?.map_or_else(Vec::new, |z| {
                    match normalize_range(start, stop, z.len()) {
                        Some((from, to)) => {
                            z.iter().skip(from).take(to - from + 1).map(|(m, _)| m.clone()).collect()
                        }
                        None => Vec::new(),
                    }
                });
                Ok(Reply::Int(self.zrem_all(&key, doomed)?))
            }
            Command::ZRemRangeByScore { key, min, max } => {
                let doomed: Vec<Bytes> = self.zset(&key)?.map_or_else(Vec::new, |z| {
                    z.iter().filter(|(_, s)| *s >= min && *s <= max).map(|(m, _)| m.clone()).collect()
                });
                Ok(Reply::Int(self.zrem_all(&key, doomed)?))
            }
            Command::ZRemRangeByLex { key, min, max } => {
                let doomed: Vec<Bytes> = self.zset(&key)?.map_or_else(Vec::new, |z| {
                    z.iter().filter(|(m, _)| in_lex_range(m, &min, &max)).map(|(m, _)| m.clone()).collect()
                });
                Ok(Reply::Int(self.zrem_all(&key, doomed)?))
            }
            Command::ZScan { key, cursor, pattern, count } => {
                let scored: Vec<(Bytes, f64)> = self
                    .zset(&key)?
                    .map_or_else(Vec::new, |z| z.iter().map(|(m, s)| (m.clone(), s)).collect());
                let (next, window) = scan_window(&scored, cursor, count);
                let mut flat = Vec::new();
                for (member, score) in window {
                    if pattern.as_deref().map_or(true, |p| glob_match(p.as_bytes(), member)) {
                        push_scored(&mut flat, member.clone(), *score, true);
                    }
                }
                Ok(Reply::Array(vec![Reply::bulk(next.to_string()), Reply::Array(flat)]))
            }
            Command::ZCombineStore { op, destination, keys, aggregate } => {
                let combined = self.combine_sorted_sets(op, &keys, aggregate)?;
                let len = combined.len();
                self.store(&destination, Value::ZSet(combined));
                Ok(Reply::Int(len as i64))
            }

            // -----------------------------------------------------------------
            // HyperLogLog
            // -----------------------------------------------------------------
            Command::PfAdd { key, elements } => {
                let created = !self.exists(&key);
                if created {
                    self.entries
                        .insert(key.as_str().to_string(), Entry::new(Value::Hll(Box::default())));
                }
                let Some(hll) = self.hll(&key)? else {
                    return Ok(Reply::Int(0));
                };
                let mut changed = false;
                for element in &elements {
                    changed |= hll.add(element);
                }
                Ok(Reply::Int((created || changed) as i64))
            }
            Command::PfCount { keys } => {
                let mut union = HyperLogLog::new();
                for key in &keys {
                    if let Some(hll) = self.hll(key)? {
                        union.merge(hll);
                    }
                }
                Ok(Reply::Int(union.count() as i64))
            }
            Command::PfMerge { destination, sources } => {
                let mut merged = self.hll(&destination)?.cloned().unwrap_or_default();
                for key in &sources {
                    if let Some(hll) = self.hll(key)? {
                        merged.merge(hll);
                    }
                }
                let expires_at = self.live(&destination).and_then(|e| e.expires_at);
                let mut entry = Entry::new(Value::Hll(Box::new(merged)));
                entry.expires_at = expires_at;
                self.entries.insert(destination.into_string(), entry);
                Ok(Reply::Ok)
            }
        }
    }

    // =========================================================================
    // Combine Helpers
    // =========================================================================

    fn combine_sets(&mut self, op: SetOp, keys: &[StoreKey]) -> Result<BTreeSet<Bytes>> {
        let mut sets = Vec::with_capacity(keys.len());
        for key in keys {
            sets.push(self.set_snapshot(key)?);
        }
        let mut iter = sets.into_iter();
        let Some(first) = iter.next() else {
            return Ok(BTreeSet::new());
        };
        Ok(iter.fold(first, |acc, next| match op {
            SetOp::Intersect => acc.intersection(&next).cloned().collect(),
            SetOp::Union => acc.union(&next).cloned().collect(),
            SetOp::Difference => acc.difference(&next).cloned().collect(),
        }))
    }

    /// Scored view of a key for ZINTERSTORE / ZUNIONSTORE; plain sets score 1
    fn scored_snapshot(&mut self, key: &StoreKey) -> Result<HashMap<Bytes, f64>> {
        match self.live(key) {
            None => Ok(HashMap::new()),
            Some(Entry { value: Value::ZSet(z), .. }) => {
                Ok(z.iter().map(|(m, s)| (m.clone(), s)).collect())
            }
            Some(Entry { value: Value::Set(s), .. }) => Ok(s.iter().map(|m| (m.clone(), 1.0)).collect()),
            Some(_) => Err(Error::WrongType),
        }
    }

    fn combine_sorted_sets(
        &mut self,
        op: SortedSetOp,
        keys: &[StoreKey],
        aggregate: Aggregate,
    ) -> Result<SortedSet> {
        let mut inputs = Vec::with_capacity(keys.len());
        for key in keys {
            inputs.push(self.scored_snapshot(key)?);
        }

        let fold = |a: f64, b: f64| match aggregate {
            Aggregate::Sum => a + b,
            Aggregate::Min => a.min(b),
            Aggregate::Max => a.max(b),
        };

        let mut acc: HashMap<Bytes, f64> = inputs.first().cloned().unwrap_or_default();
        for next in inputs.iter().skip(1) {
            match op {
                SortedSetOp::Union => {
                    for (member, score) in next {
                        acc.entry(member.clone())
                            .and_modify(|s| *s = fold(*s, *score))
                            .or_insert(*score);
                    }
                }
                SortedSetOp::Intersect => {
                    acc = acc
                        .into_iter()
                        .filter_map(|(m, s)| next.get(&m).map(|t| (m, fold(s, *t))))
                        .collect();
                }
            }
        }

        let mut out = SortedSet::default();
        for (member, score) in acc {
            // inf + -inf sums to NaN; the store reports 0 for it
            out.insert(member, if score.is_nan() { 0.0 } else { score })?;
        }
        Ok(out)
    }

    fn zrem_all(&mut self, key: &StoreKey, members: Vec<Bytes>) -> Result<i64> {
        let removed = match self.zset(key)? {
            Some(zset) => members.iter().filter(|m| zset.remove(m)).count(),
            None => 0,
        };
        self.drop_if_empty(key);
        Ok(removed as i64)
    }
}

// =============================================================================
// Free Helpers
// =============================================================================

/// Resolve an inclusive `[start, stop]` index range with negative indexes
/// counted from the tail. None when the range is empty.
fn normalize_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// LREM semantics: 0 removes all, positive from head, negative from tail
fn remove_occurrences(list: &mut VecDeque<Bytes>, value: &Bytes, count: i64) -> usize {
    let limit = if count == 0 { usize::MAX } else { count.unsigned_abs() as usize };
    let mut removed = 0;
    if count >= 0 {
        let mut i = 0;
        while i < list.len() && removed < limit {
            if list[i] == *value {
                list.remove(i);
                removed += 1;
            } else {
                i += 1;
            }
        }
    } else {
        let mut i = list.len();
        while i > 0 && removed < limit {
            i -= 1;
            if list[i] == *value {
                list.remove(i);
                removed += 1;
            }
        }
    }
    removed
}

/// One scan step: `count` items from `cursor`, then the next cursor (0 at end)
fn scan_window<T>(items: &[T], cursor: u64, count: Option<usize>) -> (u64, &[T]) {
    let count = count.unwrap_or(DEFAULT_SCAN_COUNT).max(1);
    let from = (cursor as usize).min(items.len());
    let to = from.saturating_add(count).min(items.len());
    let next = if to >= items.len() { 0 } else { to as u64 };
    (next, &items[from..to])
}

fn in_lex_range(member: &Bytes, min: &LexBound, max: &LexBound) -> bool {
    let above = match min {
        LexBound::Unbounded => true,
        LexBound::Inclusive(v) => member.as_ref() >= v.as_ref(),
        LexBound::Exclusive(v) => member.as_ref() > v.as_ref(),
    };
    let below = match max {
        LexBound::Unbounded => true,
        LexBound::Inclusive(v) => member.as_ref() <= v.as_ref(),
        LexBound::Exclusive(v) => member.as_ref() < v.as_ref(),
    };
    above && below
}

fn push_scored(flat: &mut Vec<Reply>, member: Bytes, score: f64, with_score: bool) {
    flat.push(Reply::Bulk(member));
    if with_score {
        flat.push(Reply::Bulk(format_score(score)));
    }
}
