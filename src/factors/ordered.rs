// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Ordered multiplicative factorizations.
//!
//! `Factors` lists every ordered tuple of `order` positive integers whose
//! product is `n`. Order matters: `(2, 6)` and `(6, 2)` are distinct.
//!
//! # Search
//!
//! The enumeration runs on the backtracking [`SearchEngine`]. One
//! `SplitPredicate` round chooses the factor of one tiling level among the
//! divisors of `n`, skipping divisors that do not divide the remaining
//! residual. The last level takes whatever residual is left. A terminal
//! `RecordPredicate` copies the finished tuple out and fails, so the engine
//! backtracks through every choice.
//!
//! The first chosen factor lands in the last tuple position, so the output
//! order matches this recursive definition:
//!
//! ```text
//! split(r, 0) = [()]
//! split(r, 1) = [(r)]
//! split(r, k) = [ t ++ (f) | f <- divisors(n), r mod f == 0, t <- split(r / f, k - 1) ]
//! ```
//!
//! # Example
//!
//! ```
//! use tiling_factors::Factors;
//!
//! let factors = Factors::new(12, 2);
//! assert_eq!(factors.len(), 6);
//! assert_eq!(&factors[0], &[12, 1]);
//! assert!(factors.iter().all(|t| t.iter().product::<u64>() == 12));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use tracing::debug;

use super::given::GivenFactors;
use super::check_order;
use crate::engine::{EngineBuilder, Predicate, PredicateResult, SearchState, TerminalPredicate};
use crate::error::{FactorError, Result};
use crate::numeric::DivisorSet;
use crate::statistics::{Counters, Statistics};
use crate::trail::Trail;

/// Trail slot holding the residual still to be factored.
const RESIDUAL_SLOT: usize = 0;

/// Search state for one ordered factorization.
///
/// Slot 0 of the trail is the residual; slots `1..=levels` hold the tuple.
#[derive(Debug)]
struct SplitState {
    divisors: Vec<u64>,
    levels: usize,
    trail: Trail,
    tuples: Vec<Vec<u64>>,
    statistics: Statistics,
}

impl SplitState {
    fn new(divisors: &[u64], residual: u64, levels: usize) -> Self {
        let mut trail = Trail::with_slots(levels + 1);
        trail.set(RESIDUAL_SLOT, residual);
        Self {
            divisors: divisors.to_vec(),
            levels,
            trail,
            tuples: Vec::new(),
            statistics: Statistics::new(),
        }
    }

    #[inline]
    fn position_slot(position: usize) -> usize {
        position + 1
    }
}

impl SearchState for SplitState {
    fn trail(&self) -> &Trail {
        &self.trail
    }

    fn trail_mut(&mut self) -> &mut Trail {
        &mut self.trail
    }
}

/// Chooses the factor of tiling level `round`.
#[derive(Debug)]
struct SplitPredicate;

impl Predicate<SplitState> for SplitPredicate {
    fn try_pred(&mut self, ctx: &mut SplitState, round: usize) -> PredicateResult {
        match ctx.levels - round {
            0 => PredicateResult::Success,
            1 => {
                let residual = ctx.trail.get(RESIDUAL_SLOT);
                ctx.trail.set(SplitState::position_slot(0), residual);
                PredicateResult::Success
            }
            _ => PredicateResult::Choices(ctx.divisors.len()),
        }
    }

    fn retry_pred(&mut self, ctx: &mut SplitState, round: usize, choice: usize) -> PredicateResult {
        let factor = ctx.divisors[choice];
        let residual = ctx.trail.get(RESIDUAL_SLOT);
        ctx.statistics.increment_counter(Counters::DivisorsTried);

        // Only acceptable if the residual is divisible by it
        if residual % factor != 0 {
            ctx.statistics.increment_counter(Counters::DivisorsSkipped);
            return PredicateResult::Failure;
        }

        ctx.trail.set(RESIDUAL_SLOT, residual / factor);
        let position = ctx.levels - 1 - round;
        ctx.trail.set(SplitState::position_slot(position), factor);
        PredicateResult::SuccessSamePredicate
    }

    fn name(&self) -> &str {
        "Split"
    }
}

/// Records the finished tuple, then fails to continue the enumeration.
#[derive(Debug)]
struct RecordPredicate;

impl Predicate<SplitState> for RecordPredicate {
    fn try_pred(&mut self, ctx: &mut SplitState, _round: usize) -> PredicateResult {
        let first = SplitState::position_slot(0);
        let tuple = ctx.trail.values()[first..first + ctx.levels].to_vec();
        ctx.tuples.push(tuple);
        PredicateResult::Failure
    }

    fn name(&self) -> &str {
        "Record"
    }
}

impl TerminalPredicate<SplitState> for RecordPredicate {}

/// Every ordered factorization of `residual` into `levels` divisors of `n`.
fn split(divisors: &DivisorSet, residual: u64, levels: usize) -> (Vec<Vec<u64>>, Statistics) {
    let mut state = SplitState::new(divisors.as_slice(), residual, levels);
    let mut engine = EngineBuilder::<SplitState>::new()
        .add(Box::new(SplitPredicate))
        .terminal(RecordPredicate)
        .build();
    engine.search(&mut state);

    (state.tuples, state.statistics)
}

/// All ordered factorizations of `n` into `order` factors.
///
/// The collection is built eagerly at construction and is read-only apart
/// from [`prune_max`](Factors::prune_max).
#[derive(Debug, Clone)]
pub struct Factors {
    n: u64,
    order: usize,
    divisors: DivisorSet,
    cofactors: Vec<Vec<u64>>,
    statistics: Statistics,
}

impl Factors {
    /// Enumerate every factorization of `n` into `order` factors.
    ///
    /// # Panics
    ///
    /// Panics if `order` exceeds [`MAX_ORDER`](super::MAX_ORDER).
    pub fn new(n: u64, order: usize) -> Self {
        Self::with_given(n, order, &GivenFactors::new())
    }

    /// Enumerate factorizations with some positions pinned.
    ///
    /// Given factors that do not divide `n` (taking the already accepted
    /// ones into account) are dropped with a warning and their positions
    /// become free.
    ///
    /// # Panics
    ///
    /// Panics if there are more given factors than `order`, if a given
    /// position is not below `order`, or if `order` exceeds
    /// [`MAX_ORDER`](super::MAX_ORDER).
    pub fn with_given(n: u64, order: usize, given: &GivenFactors) -> Self {
        match Self::try_with_given(n, order, given) {
            Ok(factors) => factors,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_new(n: u64, order: usize) -> Result<Self> {
        Self::try_with_given(n, order, &GivenFactors::new())
    }

    pub fn try_with_given(n: u64, order: usize, given: &GivenFactors) -> Result<Self> {
        check_order(order)?;
        given.check_order(order)?;

        let (accepted, partial_product) = given.validate(n);
        let divisors = DivisorSet::new(n);

        let levels = order - accepted.len();
        let (mut cofactors, mut statistics) = split(&divisors, n / partial_product, levels);
        for tuple in cofactors.iter_mut() {
            accepted.splice_into(tuple);
        }

        statistics.set(Counters::GivenDropped, (given.len() - accepted.len()) as u64);
        statistics.set(Counters::Solutions, cofactors.len() as u64);
        debug!(n, order, given = accepted.len(), %statistics, "ordered factorization complete");

        Ok(Self {
            n,
            order,
            divisors,
            cofactors,
            statistics,
        })
    }

    /// Remove every tuple with a factor above the maximum given for its position.
    ///
    /// Idempotent.
    ///
    /// # Panics
    ///
    /// Panics if a position is not below the decomposition order.
    pub fn prune_max(&mut self, max: &BTreeMap<usize, u64>) {
        if let Err(err) = self.try_prune_max(max) {
            panic!("{}", err);
        }
    }

    pub fn try_prune_max(&mut self, max: &BTreeMap<usize, u64>) -> Result<()> {
        if let Some(&position) = max.keys().find(|&&p| p >= self.order) {
            return Err(FactorError::PrunePositionOutOfRange {
                position,
                order: self.order,
            });
        }

        let before = self.cofactors.len();
        self.cofactors
            .retain(|tuple| max.iter().all(|(&position, &limit)| tuple[position] <= limit));
        debug!(
            n = self.n,
            pruned = before - self.cofactors.len(),
            remaining = self.cofactors.len(),
            "pruned factorizations above per-position maxima"
        );
        self.statistics.set(Counters::Solutions, self.cofactors.len() as u64);
        Ok(())
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Divisors of `n` in the order they were branched on.
    pub fn divisors(&self) -> &DivisorSet {
        &self.divisors
    }

    pub fn get(&self, index: usize) -> Option<&[u64]> {
        self.cofactors.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.cofactors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cofactors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u64]> + '_ {
        self.cofactors.iter().map(Vec::as_slice)
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Print the divisor listing and every factorization to stdout.
    pub fn print(&self) {
        println!("{}", self.divisors);
        print!("{}", self);
    }
}

impl Index<usize> for Factors {
    type Output = [u64];

    fn index(&self, index: usize) -> &[u64] {
        &self.cofactors[index]
    }
}

impl fmt::Display for Factors {
    /// One `n = f1 * f2 * ...` line per factorization.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Co-factors of {} are: ", self.n)?;
        for cofactors in &self.cofactors {
            write!(f, "    {} = ", self.n)?;
            super::write_product(f, cofactors)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuples(factors: &Factors) -> Vec<Vec<u64>> {
        factors.iter().map(<[u64]>::to_vec).collect()
    }

    #[test]
    fn test_twelve_into_two() {
        let factors = Factors::new(12, 2);
        assert_eq!(
            tuples(&factors),
            vec![
                vec![12, 1],
                vec![1, 12],
                vec![6, 2],
                vec![2, 6],
                vec![4, 3],
                vec![3, 4],
            ]
        );
    }

    #[test]
    fn test_order_zero_is_single_empty_tuple() {
        let factors = Factors::new(12, 0);
        assert_eq!(factors.len(), 1);
        assert!(factors[0].is_empty());
    }

    #[test]
    fn test_order_one() {
        let factors = Factors::new(30, 1);
        assert_eq!(tuples(&factors), vec![vec![30]]);
    }

    #[test]
    fn test_n_one_is_all_ones() {
        for order in 1..=5 {
            let factors = Factors::new(1, order);
            assert_eq!(tuples(&factors), vec![vec![1; order]]);
        }
    }

    #[test]
    fn test_n_zero() {
        assert_eq!(tuples(&Factors::new(0, 1)), vec![vec![0]]);
        assert!(Factors::new(0, 2).is_empty());
    }

    #[test]
    fn test_prime_into_three() {
        let factors = Factors::new(7, 3);
        assert_eq!(factors.len(), 3);
        for tuple in factors.iter() {
            assert_eq!(tuple.iter().filter(|&&f| f == 7).count(), 1);
            assert_eq!(tuple.iter().filter(|&&f| f == 1).count(), 2);
        }
    }

    #[test]
    fn test_given_position() {
        let given: GivenFactors = [(1, 4)].into_iter().collect();
        let factors = Factors::with_given(12, 3, &given);
        assert_eq!(tuples(&factors), vec![vec![3, 4, 1], vec![1, 4, 3]]);
    }

    #[test]
    fn test_invalid_given_becomes_free() {
        let given: GivenFactors = [(0, 5)].into_iter().collect();
        let factors = Factors::with_given(12, 2, &given);
        assert_eq!(factors.len(), Factors::new(12, 2).len());
        assert_eq!(factors.statistics().get(Counters::GivenDropped), 1);
    }

    #[test]
    #[should_panic(expected = "exceed decomposition order")]
    fn test_too_many_given() {
        let given: GivenFactors = [(0, 2), (1, 2)].into_iter().collect();
        Factors::with_given(12, 1, &given);
    }

    #[test]
    fn test_order_too_large() {
        assert!(matches!(
            Factors::try_new(2, super::super::MAX_ORDER + 1),
            Err(FactorError::OrderTooLarge { .. })
        ));
    }

    #[test]
    fn test_prune_max() {
        let mut factors = Factors::new(12, 2);
        let max: BTreeMap<usize, u64> = [(0, 3)].into_iter().collect();
        factors.prune_max(&max);
        assert_eq!(tuples(&factors), vec![vec![1, 12], vec![2, 6], vec![3, 4]]);

        // Pruning again changes nothing
        factors.prune_max(&max);
        assert_eq!(factors.len(), 3);
    }

    #[test]
    fn test_prune_position_out_of_range() {
        let mut factors = Factors::new(12, 2);
        let max: BTreeMap<usize, u64> = [(2, 3)].into_iter().collect();
        assert_eq!(
            factors.try_prune_max(&max),
            Err(FactorError::PrunePositionOutOfRange { position: 2, order: 2 })
        );
        assert_eq!(factors.len(), 6);
    }

    #[test]
    fn test_statistics() {
        let factors = Factors::new(12, 2);
        let stats = factors.statistics();
        assert_eq!(stats.get(Counters::DivisorsTried), 6);
        assert_eq!(stats.get(Counters::DivisorsSkipped), 0);
        assert_eq!(stats.get(Counters::Solutions), 6);
    }

    #[test]
    fn test_display() {
        let factors = Factors::new(6, 2);
        assert_eq!(
            factors.to_string(),
            "Co-factors of 6 are: \n    6 = 6 * 1\n    6 = 1 * 6\n    6 = 3 * 2\n    6 = 2 * 3\n"
        );
    }

    #[test]
    fn test_get_out_of_range() {
        let factors = Factors::new(6, 2);
        assert!(factors.get(4).is_none());
        assert_eq!(factors.get(0), Some(&[6, 1][..]));
    }
}
