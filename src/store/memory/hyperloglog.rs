//! HyperLogLog cardinality estimator
//!
//! Dense layout with 2^14 six-bit registers (stored one per byte), the same
//! precision the store uses, giving a standard error of about 0.81%.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Register index bits
const PRECISION: u32 = 14;

/// Number of registers
const REGISTERS: usize = 1 << PRECISION;

/// Bias-correction constant for m = 16384
const ALPHA: f64 = 0.7213 / (1.0 + 1.079 / REGISTERS as f64);

#[derive(Clone)]
pub(super) struct HyperLogLog {
    registers: Vec<u8>,
}

impl std::fmt::Debug for HyperLogLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperLogLog").field("estimate", &self.count()).finish()
    }
}

impl Default for HyperLogLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperLogLog {
    pub fn new() -> Self {
        Self { registers: vec![0; REGISTERS] }
    }

    /// Observe an element; true if any register changed
    pub fn add(&mut self, element: &[u8]) -> bool {
        let mut hasher = DefaultHasher::new();
        element.hash(&mut hasher);
        let hash = hasher.finish();

        let index = (hash & (REGISTERS as u64 - 1)) as usize;
        // Sentinel bit caps the run length at 64 - PRECISION + 1
        let rest = (hash >> PRECISION) | (1 << (64 - PRECISION));
        let rank = (rest.trailing_zeros() + 1) as u8;

        if rank > self.registers[index] {
            self.registers[index] = rank;
            true
        } else {
            false
        }
    }

    /// Register-wise maximum with `other`
    pub fn merge(&mut self, other: &HyperLogLog) {
        for (mine, theirs) in self.registers.iter_mut().zip(&other.registers) {
            if *theirs > *mine {
                *mine = *theirs;
            }
        }
    }

    /// Approximate number of distinct elements observed
    pub fn count(&self) -> u64 {
        let m = REGISTERS as f64;
        let mut sum = 0.0;
        let mut zeros = 0usize;
        for &reg in &self.registers {
            sum += 2f64.powi(-(reg as i32));
            if reg == 0 {
                zeros += 1;
            }
        }

        let raw = ALPHA * m * m / sum;
        let estimate = if raw <= 2.5 * m && zeros > 0 {
            // Linear counting for small cardinalities
            m * (m / zeros as f64).ln()
        } else {
            raw
        };
        estimate.round() as u64
    }
}
