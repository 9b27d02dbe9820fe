//! Reply definitions
//!
//! Store replies follow the RESP2 shapes: nil, status, integer, bulk string
//! and array. Scores travel as bulk strings.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::model::{parse_f64, parse_i64};

/// A reply from the store
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Absent value
    Nil,

    /// Status reply (`OK`)
    Ok,

    /// Integer reply
    Int(i64),

    /// Bulk string
    Bulk(Bytes),

    /// Array of replies
    Array(Vec<Reply>),
}

impl Reply {
    /// Create a bulk reply from anything byte-like
    pub fn bulk(value: impl Into<Bytes>) -> Self {
        Reply::Bulk(value.into())
    }

    /// Create an array of bulk replies
    pub fn bulks<I, B>(values: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Reply::Array(values.into_iter().map(|v| Reply::Bulk(v.into())).collect())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    /// Integer reply; bulk strings holding an integer are accepted
    pub fn into_int(self) -> Result<i64> {
        match self {
            Reply::Int(n) => Ok(n),
            Reply::Bulk(b) => parse_i64(&b),
            other => Err(unexpected("integer", &other)),
        }
    }

    /// Integer reply read as a flag (`1` / `0`)
    pub fn into_bool(self) -> Result<bool> {
        Ok(self.into_int()? != 0)
    }

    /// Bulk reply or nil
    pub fn into_bytes(self) -> Result<Option<Bytes>> {
        match self {
            Reply::Nil => Ok(None),
            Reply::Bulk(b) => Ok(Some(b)),
            Reply::Int(n) => Ok(Some(Bytes::from(n.to_string()))),
            other => Err(unexpected("bulk string", &other)),
        }
    }

    /// Bulk reply decoded as a score, or nil
    pub fn into_score(self) -> Result<Option<f64>> {
        match self.into_bytes()? {
            Some(b) => Ok(Some(parse_f64(&b)?)),
            None => Ok(None),
        }
    }

    /// Array reply; nil reads as empty
    pub fn into_array(self) -> Result<Vec<Reply>> {
        match self {
            Reply::Array(items) => Ok(items),
            Reply::Nil => Ok(Vec::new()),
            other => Err(unexpected("array", &other)),
        }
    }

    /// Array of bulk strings, nil elements dropped
    pub fn into_bytes_list(self) -> Result<Vec<Bytes>> {
        let mut out = Vec::new();
        for item in self.into_array()? {
            if let Some(b) = item.into_bytes()? {
                out.push(b);
            }
        }
        Ok(out)
    }

    /// Flat `[name, value, name, value, ...]` array as pairs
    pub fn into_pairs(self) -> Result<Vec<(Bytes, Bytes)>> {
        let items = self.into_bytes_list()?;
        if items.len() % 2 != 0 {
            return Err(Error::Server(format!("odd-length pair reply ({} items)", items.len())));
        }
        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(name), Some(value)) = (iter.next(), iter.next()) {
            pairs.push((name, value));
        }
        Ok(pairs)
    }

    /// Scan page: `[cursor, [items...]]`
    pub fn into_scan_page(self) -> Result<(u64, Reply)> {
        let mut items = self.into_array()?.into_iter();
        match (items.next(), items.next()) {
            (Some(cursor), Some(batch)) => {
                let cursor = cursor.into_int()?;
                let cursor = u64::try_from(cursor)
                    .map_err(|_| Error::Server(format!("negative scan cursor {}", cursor)))?;
                Ok((cursor, batch))
            }
            _ => Err(Error::Server("malformed scan reply".to_string())),
        }
    }
}

fn unexpected(expected: &str, got: &Reply) -> Error {
    Error::Server(format!("expected {} reply, got {:?}", expected, got))
}
