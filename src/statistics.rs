// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Each enumerator counts the work it did while building its collection.
//! The counts are reported through `tracing` at debug level and can be read
//! back from the enumerator afterwards.

use std::fmt;

use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

#[derive(Debug, EnumCountMacro, EnumIter, IntoStaticStr, Copy, Clone, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Counters {
    /// Divisors tried as the factor of one tiling level.
    DivisorsTried,
    /// Tried divisors that did not divide the remaining residual.
    DivisorsSkipped,
    /// Given factors dropped during validation.
    GivenDropped,
    /// Factor tuples that passed the admissibility prune.
    FactorCandidates,
    /// Residual tuples that passed the sum prune.
    ResidualCandidates,
    /// (factor, residual) pairs checked against the reconstruction equation.
    EquationChecks,
    /// Decompositions kept in the collection.
    Solutions,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Statistics {
    stats: [u64; Counters::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    pub(crate) fn increment_counter(&mut self, counter: Counters) {
        self.add(counter, 1);
    }

    pub(crate) fn add(&mut self, counter: Counters, amount: u64) {
        self.stats[counter as usize] += amount;
    }

    pub(crate) fn set(&mut self, counter: Counters, value: u64) {
        self.stats[counter as usize] = value;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }
}

impl fmt::Display for Statistics {
    /// Nonzero counters as `name=value`, space separated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for counter in Counters::iter() {
            let value = self.get(counter);
            if value == 0 {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            let name: &'static str = counter.into();
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}
