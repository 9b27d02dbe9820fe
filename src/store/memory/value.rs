//! Stored values
//!
//! One variant per structure kind, plus the sorted-set index.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::time::Instant;

use bytes::Bytes;

use super::hyperloglog::HyperLogLog;
use crate::error::{Error, Result};

/// A value with its optional expiry
#[derive(Debug, Clone)]
pub(super) struct Entry {
    pub value: Value,
    pub expires_at: Option<Instant>,
}

impl Entry {
    pub fn new(value: Value) -> Self {
        Self { value, expires_at: None }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

/// Payload stored at a key
#[derive(Debug, Clone)]
pub(super) enum Value {
    Str(Bytes),
    Hash(BTreeMap<String, Bytes>),
    List(VecDeque<Bytes>),
    Set(BTreeSet<Bytes>),
    ZSet(SortedSet),
    Hll(Box<HyperLogLog>),
}

impl Value {
    /// Collections vanish when their last element is removed
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Value::Str(_) | Value::Hll(_) => false,
            Value::Hash(h) => h.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::Set(s) => s.is_empty(),
            Value::ZSet(z) => z.is_empty(),
        }
    }
}

// =============================================================================
// Sorted Set
// =============================================================================

/// Total order over f64 scores
#[derive(Debug, Clone, Copy)]
pub(super) struct Score(pub f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Members ordered by (score, member)
#[derive(Debug, Clone, Default)]
pub(super) struct SortedSet {
    scores: HashMap<Bytes, f64>,
    order: BTreeSet<(Score, Bytes)>,
}

impl SortedSet {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Insert or rescore; true if the member is new
    pub fn insert(&mut self, member: Bytes, score: f64) -> Result<bool> {
        if score.is_nan() {
            return Err(Error::Server("score is not a valid float".to_string()));
        }
        let is_new = match self.scores.insert(member.clone(), score) {
            Some(old) => {
                self.order.remove(&(Score(old), member.clone()));
                false
            }
            None => true,
        };
        self.order.insert((Score(score), member));
        Ok(is_new)
    }

    /// Add `delta` to the member's score (0 if absent)
    pub fn increment(&mut self, member: Bytes, delta: f64) -> Result<f64> {
        let next = self.scores.get(&member).copied().unwrap_or(0.0) + delta;
        if next.is_nan() {
            return Err(Error::Server("resulting score is not a number (NaN)".to_string()));
        }
        self.insert(member, next)?;
        Ok(next)
    }

    pub fn remove(&mut self, member: &Bytes) -> bool {
        match self.scores.remove(member) {
            Some(score) => {
                self.order.remove(&(Score(score), member.clone()));
                true
            }
            None => false,
        }
    }

    pub fn score(&self, member: &Bytes) -> Option<f64> {
        self.scores.get(member).copied()
    }

    pub fn rank(&self, member: &Bytes) -> Option<usize> {
        let score = self.score(member)?;
        let target = (Score(score), member.clone());
        Some(self.order.range(..target).count())
    }

    /// Members in ascending (score, member) order
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, f64)> {
        self.order.iter().map(|(score, member)| (member, score.0))
    }

    /// Remove and return the lowest-scored member
    pub fn pop_min(&mut self) -> Option<(Bytes, f64)> {
        let (score, member) = self.order.pop_first()?;
        self.scores.remove(&member);
        Some((member, score.0))
    }
}

/// Score as a bulk string: integral scores print without a fraction
pub(super) fn format_score(score: f64) -> Bytes {
    if score.is_finite() && score.fract() == 0.0 && score.abs() < 1e17 {
        Bytes::from((score as i64).to_string())
    } else {
        Bytes::from(score.to_string())
    }
}
