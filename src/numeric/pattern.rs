// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Index streams over `[0, bound)` with 128-bit bounds.
//!
//! Simulators use these to walk an address space either in order or
//! uniformly at random.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{FactorError, Result};

/// A stream of indices in `[0, bound)`.
pub trait PatternGenerator128 {
    /// Exclusive upper limit of generated indices.
    fn bound(&self) -> u128;

    /// Produce the next index.
    fn next(&mut self) -> u128;
}

/// Yields `0, 1, ..., bound - 1`, optionally wrapping around.
#[derive(Debug, Clone)]
pub struct SequenceGenerator128 {
    bound: u128,
    autoloop: bool,
    cur: u128,
}

impl SequenceGenerator128 {
    pub fn new(bound: u128, autoloop: bool) -> Result<Self> {
        if bound == 0 {
            return Err(FactorError::ZeroBound);
        }
        Ok(Self {
            bound,
            autoloop,
            cur: 0,
        })
    }
}

impl PatternGenerator128 for SequenceGenerator128 {
    fn bound(&self) -> u128 {
        self.bound
    }

    /// # Panics
    ///
    /// Panics when a non-looping sequence is advanced past its last index.
    fn next(&mut self) -> u128 {
        assert!(
            self.cur < self.bound,
            "sequence generator advanced past bound {}",
            self.bound
        );
        let value = self.cur;
        self.cur += 1;
        if self.cur == self.bound && self.autoloop {
            self.cur = 0;
        }
        value
    }
}

/// Yields indices drawn uniformly from `[0, bound)`.
#[derive(Debug, Clone)]
pub struct RandomGenerator128 {
    bound: u128,
    rng: StdRng,
}

impl RandomGenerator128 {
    /// Generator seeded from the operating system.
    pub fn new(bound: u128) -> Result<Self> {
        Self::with_rng(bound, StdRng::from_entropy())
    }

    /// Reproducible generator.
    pub fn with_seed(bound: u128, seed: u64) -> Result<Self> {
        Self::with_rng(bound, StdRng::seed_from_u64(seed))
    }

    fn with_rng(bound: u128, rng: StdRng) -> Result<Self> {
        if bound == 0 {
            return Err(FactorError::ZeroBound);
        }
        Ok(Self { bound, rng })
    }
}

impl PatternGenerator128 for RandomGenerator128 {
    fn bound(&self) -> u128 {
        self.bound
    }

    fn next(&mut self) -> u128 {
        self.rng.gen_range(0..self.bound)
    }
}
