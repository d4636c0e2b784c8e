//! Golden-ratio constants and the Fibonacci-derived branching table
//!
//! Everything here is a pure function or an immutable table; nothing is
//! memoized at runtime.

use crate::{Error, Result};

/// The golden ratio φ = (1 + √5) / 2
pub const PHI: f64 = 1.618_033_988_749_895;

/// φ⁻¹ = φ − 1
pub const PHI_INV: f64 = 0.618_033_988_749_895;

/// Branching candidates: Fibonacci values F3..F10 (every distinct value ≥ 2
/// up to 55), ascending.
pub const BRANCHING_FACTORS: [usize; 8] = [2, 3, 5, 8, 13, 21, 34, 55];

/// Largest fan-out in the default table
pub const MAX_BRANCHING_FACTOR: usize = 55;

/// The n-th Fibonacci number with F0 = 0, F1 = F2 = 1
///
/// Returns `None` once the value no longer fits in a `u64` (n > 93).
pub fn fibonacci(n: u32) -> Option<u64> {
    if n == 0 {
        return Some(0);
    }
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 1..n {
        let next = a.checked_add(b)?;
        a = b;
        b = next;
    }
    Some(b)
}

/// First `count` Fibonacci numbers, F0 through F(count-1), stopping early at
/// the `u64` limit
pub fn fibonacci_sequence(count: usize) -> Vec<u64> {
    (0..count)
        .map_while(|n| u32::try_from(n).ok().and_then(fibonacci))
        .collect()
}

/// Whether `n` is a Fibonacci number
///
/// Walks the sequence (at most 94 steps) rather than the 5n²±4 square
/// test, which overflows for the largest `u64` values.
pub fn is_fibonacci(n: u64) -> bool {
    let (mut a, mut b) = (0u64, 1u64);
    while a < n {
        match a.checked_add(b) {
            Some(next) => {
                a = b;
                b = next;
            }
            None => return b == n,
        }
    }
    a == n
}

/// Largest default candidate `f` with `f <= num_nodes`, or 2 when none fits
pub fn select_branching_factor(num_nodes: usize) -> usize {
    BranchingTable::default().select(num_nodes)
}

/// The fixed, sorted candidate set a tree draws its per-level fan-out from
///
/// The maximum is part of a tree's identity: two trees over the same leaves
/// built with different caps will generally have different roots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchingTable {
    factors: &'static [usize],
}

impl BranchingTable {
    /// Table restricted to candidates no larger than `max`
    ///
    /// `max` must be at least 2; values between candidates round down
    /// (e.g. 40 behaves as 34).
    pub fn with_max(max: usize) -> Result<Self> {
        if max < 2 {
            return Err(Error::Config(format!(
                "max branching factor must be at least 2, got {}",
                max
            )));
        }
        let end = BRANCHING_FACTORS.partition_point(|&f| f <= max);
        Ok(BranchingTable {
            factors: &BRANCHING_FACTORS[..end],
        })
    }

    /// Candidates in ascending order
    pub fn factors(&self) -> &'static [usize] {
        self.factors
    }

    /// Largest candidate in the table
    pub fn max(&self) -> usize {
        self.factors.last().copied().unwrap_or(2)
    }

    /// Largest candidate `f` with `f <= num_nodes`; 2 when `num_nodes < 2`
    pub fn select(&self, num_nodes: usize) -> usize {
        let idx = self.factors.partition_point(|&f| f <= num_nodes);
        if idx == 0 {
            2
        } else {
            self.factors[idx - 1]
        }
    }
}

impl Default for BranchingTable {
    fn default() -> Self {
        BranchingTable {
            factors: &BRANCHING_FACTORS,
        }
    }
}
