//! Domain entity
//!
//! `MemberPoint` pairs a member id with a point. What the point means depends
//! on the structure holding it: counter, hash field, list payload, set
//! element, sorted-set score or HyperLogLog element.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hash field holding the member id
pub const MEMBER_ID_FIELD: &str = "MemberId";

/// Hash field holding the point
pub const POINT_FIELD: &str = "Point";

/// A member id paired with a point value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MemberPoint {
    #[serde(rename = "MemberId")]
    pub member_id: u32,

    #[serde(rename = "Point")]
    pub point: i64,
}

impl MemberPoint {
    pub fn new(member_id: u32, point: i64) -> Self {
        Self { member_id, point }
    }

    /// JSON form stored as a list element: `{"MemberId":1,"Point":2}`
    pub fn to_json(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Decode a stored list element
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The point as a store value (decimal string)
    pub fn point_value(&self) -> Bytes {
        Bytes::from(self.point.to_string())
    }

    /// Sorted-set member name: `Point<point>`
    ///
    /// Equal points share a member, so re-adding a point updates its score.
    pub fn sorted_set_member(&self) -> String {
        sorted_set_member(self.point)
    }
}

/// Sorted-set member name for a point value
pub fn sorted_set_member(point: i64) -> String {
    format!("{}{}", POINT_FIELD, point)
}

/// Parse a decimal integer stored as bytes
pub(crate) fn parse_i64(bytes: &[u8]) -> Result<i64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| {
            Error::Serialization(format!(
                "expected integer, got {:?}",
                String::from_utf8_lossy(bytes)
            ))
        })
}

/// Parse a score stored as bytes ("1001", "-inf", "2.5")
pub(crate) fn parse_f64(bytes: &[u8]) -> Result<f64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .ok_or_else(|| {
            Error::Serialization(format!(
                "expected number, got {:?}",
                String::from_utf8_lossy(bytes)
            ))
        })
}
