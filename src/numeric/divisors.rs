// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Divisor sets by trial division.
//!
//! Divisors are discovered in pairs `(d, n / d)` while scanning `d` up to
//! `isqrt(n)`, so the natural discovery order for 12 is `1, 12, 2, 6, 3, 4`.
//! The ordered enumerator branches on divisors in exactly this order.

use std::fmt;

use super::isqrt;

/// All positive divisors of `n`.
///
/// # Example
///
/// ```
/// use tiling_factors::numeric::DivisorSet;
///
/// let divisors = DivisorSet::new(12);
/// assert_eq!(divisors.as_slice(), &[1, 12, 2, 6, 3, 4]);
/// assert_eq!(divisors.sorted(), vec![1, 2, 3, 4, 6, 12]);
/// assert_eq!(format!("{}", divisors), "All factors of 12: 1, 12, 2, 6, 3, 4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisorSet {
    n: u64,
    divisors: Vec<u64>,
}

impl DivisorSet {
    /// Compute the divisors of `n` in O(√n).
    ///
    /// `n = 0` has no divisors in this sense and yields the empty set.
    pub fn new(n: u64) -> Self {
        let root = isqrt(n);
        let mut divisors = Vec::new();
        for d in 1..=root {
            if n % d == 0 {
                divisors.push(d);
                // d <= isqrt(n), so d * d cannot overflow
                if d * d != n {
                    divisors.push(n / d);
                }
            }
        }
        Self { n, divisors }
    }

    /// The number whose divisors these are.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Divisors in discovery order.
    pub fn as_slice(&self) -> &[u64] {
        &self.divisors
    }

    /// Divisors in ascending order.
    pub fn sorted(&self) -> Vec<u64> {
        let mut sorted = self.divisors.clone();
        sorted.sort_unstable();
        sorted
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.divisors.iter().copied()
    }

    pub fn contains(&self, d: u64) -> bool {
        d != 0 && self.n % d == 0
    }

    pub fn len(&self) -> usize {
        self.divisors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.divisors.is_empty()
    }
}

impl fmt::Display for DivisorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "All factors of {}: ", self.n)?;
        for (i, d) in self.divisors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}
