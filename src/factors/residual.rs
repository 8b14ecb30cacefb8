// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Factorizations with a boundary tile.
//!
//! A dimension of size `n` tiled over `k` nested levels does not always
//! split into an exact product of tile counts. `ResidualFactors` pairs each
//! factor tuple `f` with a residual tuple `r`, where `r_i` is how much of
//! level `i` the last (boundary) iteration actually uses. A pair covers `n`
//! exactly when its mixed-radix reconstruction is `n - 1`:
//!
//! ```text
//! V = sum_i (r_i - 1) * prod_{m < i} f_m        (position 0 least significant)
//! ```
//!
//! with `1 <= r_i <= f_i` everywhere, and `f_i` within the capacity of every
//! spatial position (a level mapped onto a fixed-size hardware resource).
//!
//! # Positions
//!
//! Spatial and given positions use the reconstruction numbering above:
//! position 0 is the innermost level. The finished tuples are reversed, so
//! index 0 of every [`ResidualDecomposition`] is the outermost level.
//!
//! # Search
//!
//! 1. The candidate pool is the divisor set of `n`, widened with every
//!    divisor below `n` of `w * n * ceil(n / w)` for each spatial width
//!    `w <= capacity`, so that boundary tiles that do not divide `n` are
//!    reachable.
//! 2. Factor tuples come from one lazy Cartesian product per rotation: the
//!    rotated position draws from the large values (`>= sqrt(n) + 1.5`), the
//!    others from the small ones. Rotation 0 lets position 0 draw from the
//!    whole pool. Tuples whose product of `(f - 1)` terms exceeds `n` are
//!    dropped before the equation is ever evaluated.
//! 3. Residual tuples are the product of `1..=capacity` over the spatial
//!    positions, filtered to sums within `n + k`.
//! 4. Every factor tuple is checked against every residual tuple. Non-spatial
//!    positions use their own factor as residual (a full last iteration).
//!
//! # Example
//!
//! ```
//! use tiling_factors::{ResidualFactors, SpatialBound};
//!
//! // 10 iterations, innermost level mapped onto a 4-wide array
//! let spatial = [SpatialBound { position: 0, capacity: 4 }];
//! let factors = ResidualFactors::new(10, 2, &spatial);
//!
//! assert_eq!(factors.len(), 4);
//! for decomposition in factors.iter() {
//!     assert_eq!(decomposition.reconstruct(), Some(9));
//! }
//! ```

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::ops::Index;

use itertools::Itertools;
use tracing::{debug, trace};

use super::given::GivenFactors;
use super::{check_order, write_product};
use crate::error::{FactorError, Result};
use crate::numeric::DivisorSet;
use crate::statistics::{Counters, Statistics};

/// Capacity limit for one tuple position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpatialBound {
    /// Position in reconstruction order (0 = innermost level).
    pub position: usize,
    /// Largest factor the position can hold.
    pub capacity: u64,
}

impl SpatialBound {
    /// Pair parallel lists of capacities and positions.
    pub fn zip(capacities: &[u64], positions: &[usize]) -> Result<Vec<SpatialBound>> {
        if capacities.len() != positions.len() {
            return Err(FactorError::SpatialLengthMismatch {
                bounds: capacities.len(),
                positions: positions.len(),
            });
        }
        Ok(positions
            .iter()
            .zip(capacities)
            .map(|(&position, &capacity)| SpatialBound { position, capacity })
            .collect())
    }
}

/// One (factor tuple, residual tuple) pair, outermost level first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidualDecomposition {
    pub factors: Vec<u64>,
    pub residuals: Vec<u64>,
}

impl ResidualDecomposition {
    /// Mixed-radix value of the residual digits, last entry least significant.
    ///
    /// A valid decomposition of `n` reconstructs to `n - 1`. Returns `None`
    /// on overflow or if a residual is zero.
    pub fn reconstruct(&self) -> Option<u64> {
        self.factors
            .iter()
            .zip(&self.residuals)
            .try_fold(0u64, |value, (&factor, &residual)| {
                value.checked_mul(factor)?.checked_add(residual.checked_sub(1)?)
            })
    }
}

/// All boundary-residual decompositions of `n` into `order` levels.
#[derive(Debug, Clone)]
pub struct ResidualFactors {
    n: u64,
    order: usize,
    divisors: DivisorSet,
    candidates: Vec<u64>,
    decompositions: Vec<ResidualDecomposition>,
    statistics: Statistics,
}

impl ResidualFactors {
    /// # Panics
    ///
    /// Panics on invalid spatial bounds or if `order` exceeds
    /// [`MAX_ORDER`](super::MAX_ORDER); see [`try_with_given`](Self::try_with_given).
    pub fn new(n: u64, order: usize, spatial: &[SpatialBound]) -> Self {
        Self::with_given(n, order, spatial, &GivenFactors::new())
    }

    /// # Panics
    ///
    /// Panics on any condition [`try_with_given`](Self::try_with_given) reports.
    pub fn with_given(n: u64, order: usize, spatial: &[SpatialBound], given: &GivenFactors) -> Self {
        match Self::try_with_given(n, order, spatial, given) {
            Ok(factors) => factors,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_new(n: u64, order: usize, spatial: &[SpatialBound]) -> Result<Self> {
        Self::try_with_given(n, order, spatial, &GivenFactors::new())
    }

    /// Enumerate decompositions with some positions pinned.
    ///
    /// Fails if `order` exceeds [`MAX_ORDER`](super::MAX_ORDER), if there
    /// are more given factors than levels, or if a given or spatial position
    /// is out of range. Spatial positions must be distinct.
    pub fn try_with_given(
        n: u64,
        order: usize,
        spatial: &[SpatialBound],
        given: &GivenFactors,
    ) -> Result<Self> {
        check_order(order)?;
        given.check_order(order)?;
        let spatial = sorted_spatial(spatial, order)?;

        let (accepted, partial_product) = given.validate(n);
        let mut statistics = Statistics::new();
        statistics.set(Counters::GivenDropped, (given.len() - accepted.len()) as u64);

        let divisors = DivisorSet::new(n);
        let candidates = candidate_pool(&divisors, &spatial);

        if order == 0 {
            statistics.set(Counters::Solutions, 1);
            return Ok(Self {
                n,
                order,
                divisors,
                candidates,
                decompositions: vec![ResidualDecomposition {
                    factors: Vec::new(),
                    residuals: Vec::new(),
                }],
                statistics,
            });
        }

        let free_n = n / partial_product;
        let levels = order - accepted.len();
        let threshold = ((n as f64).sqrt() + 1.5) as u64;

        let residual_tuples = residual_candidates(&spatial, free_n, levels);
        statistics.set(Counters::ResidualCandidates, residual_tuples.len() as u64);

        // Each pair is kept once, even when overlapping rotations rediscover
        // it. `len()` counts distinct pairs, and `EquationChecks` counts
        // every candidate tried, repeats included.
        let mut seen = HashSet::new();
        let mut decompositions = Vec::new();
        for mut factors in factor_candidates(&candidates, threshold, levels, free_n) {
            statistics.increment_counter(Counters::FactorCandidates);
            accepted.splice_into(&mut factors);

            for residual_tuple in &residual_tuples {
                statistics.increment_counter(Counters::EquationChecks);
                let Some(residuals) = solve(n, &factors, residual_tuple, &spatial) else {
                    continue;
                };

                let mut decomposition = ResidualDecomposition {
                    factors: factors.clone(),
                    residuals,
                };
                decomposition.factors.reverse();
                decomposition.residuals.reverse();

                if seen.insert(decomposition.clone()) {
                    trace!(
                        factors = ?decomposition.factors,
                        residuals = ?decomposition.residuals,
                        "accepted residual decomposition"
                    );
                    decompositions.push(decomposition);
                }
            }
        }

        statistics.set(Counters::Solutions, decompositions.len() as u64);
        debug!(n, order, spatial = spatial.len(), %statistics, "residual factorization complete");

        Ok(Self {
            n,
            order,
            divisors,
            candidates,
            decompositions,
            statistics,
        })
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn divisors(&self) -> &DivisorSet {
        &self.divisors
    }

    /// Candidate factor pool, ascending: divisors of `n` plus the spatial widening.
    pub fn candidate_factors(&self) -> &[u64] {
        &self.candidates
    }

    pub fn get(&self, index: usize) -> Option<&ResidualDecomposition> {
        self.decompositions.get(index)
    }

    pub fn len(&self) -> usize {
        self.decompositions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decompositions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResidualDecomposition> + '_ {
        self.decompositions.iter()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Print the candidate pool and every decomposition to stdout.
    pub fn print(&self) {
        let listing = self.candidates.iter().map(u64::to_string).join(", ");
        println!("All factors of {}: {}", self.n, listing);
        print!("{}", self);
    }
}

impl Index<usize> for ResidualFactors {
    type Output = ResidualDecomposition;

    fn index(&self, index: usize) -> &ResidualDecomposition {
        &self.decompositions[index]
    }
}

impl fmt::Display for ResidualFactors {
    /// One `n = f1 * f2 * ... (residuals r1, r2, ...)` line per decomposition.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Co-factors of {} are: ", self.n)?;
        for decomposition in &self.decompositions {
            write!(f, "    {} = ", self.n)?;
            write_product(f, &decomposition.factors)?;
            writeln!(f, " (residuals {})", decomposition.residuals.iter().join(", "))?;
        }
        Ok(())
    }
}

/// Validate spatial bounds and order them by position.
fn sorted_spatial(spatial: &[SpatialBound], order: usize) -> Result<Vec<SpatialBound>> {
    let mut sorted = spatial.to_vec();
    sorted.sort_by_key(|bound| bound.position);

    for (i, bound) in sorted.iter().enumerate() {
        if bound.position >= order {
            return Err(FactorError::SpatialPositionOutOfRange {
                position: bound.position,
                order,
            });
        }
        if i > 0 && sorted[i - 1].position == bound.position {
            return Err(FactorError::DuplicateSpatialPosition {
                position: bound.position,
            });
        }
    }
    Ok(sorted)
}

/// Divisors of `n`, widened with factors that reach boundary tiles.
///
/// For every spatial width `w`, `g = w * n * ceil(n / w)` is a multiple of
/// `n` padded up to a whole number of `w`-wide steps; its divisors below `n`
/// are tile sizes that leave a partial last tile. Since `g >= n * n`, the
/// cofactor `g / i` of any `i <= n` is never below `n`.
fn candidate_pool(divisors: &DivisorSet, spatial: &[SpatialBound]) -> Vec<u64> {
    let n = divisors.n();
    let mut pool: BTreeSet<u64> = divisors.iter().collect();

    for bound in spatial {
        for width in 1..=bound.capacity {
            let g = width as u128 * n as u128 * n.div_ceil(width) as u128;
            pool.extend((1..n).filter(|&i| g % i as u128 == 0));
        }
    }
    pool.into_iter().collect()
}

/// Lazy Cartesian product of `axes`, first axis slowest.
///
/// The product of no axes is the single empty tuple.
fn cartesian(axes: Vec<Vec<u64>>) -> Box<dyn Iterator<Item = Vec<u64>>> {
    if axes.is_empty() {
        Box::new(std::iter::once(Vec::new()))
    } else {
        Box::new(axes.into_iter().map(Vec::into_iter).multi_cartesian_product())
    }
}

/// Per-position candidate lists for one rotation.
fn rotation_axes(
    pool: &[u64],
    small: &[u64],
    large: &[u64],
    levels: usize,
    rotation: usize,
) -> Vec<Vec<u64>> {
    let mut axes: Vec<Vec<u64>> = (0..levels)
        .map(|i| match (i, rotation) {
            (0, 0) => pool.to_vec(),
            (0, _) => large.to_vec(),
            _ => small.to_vec(),
        })
        .collect();
    axes.swap(0, rotation);
    axes
}

/// Whether the product of `(f - 1)` over factors other than 1 stays within `limit`.
fn admissible(factors: &[u64], limit: u64) -> bool {
    let mut product: u64 = 1;
    for &factor in factors.iter().filter(|&&f| f != 1) {
        match product.checked_mul(factor - 1) {
            Some(p) if p <= limit => product = p,
            _ => return false,
        }
    }
    true
}

/// Admissible factor tuples of length `levels`, one rotation after another.
fn factor_candidates(
    pool: &[u64],
    threshold: u64,
    levels: usize,
    limit: u64,
) -> impl Iterator<Item = Vec<u64>> {
    let small: Vec<u64> = pool.iter().copied().filter(|&a| a <= threshold).collect();
    let large: Vec<u64> = pool.iter().copied().filter(|&a| a >= threshold).collect();

    let rotations: Vec<Vec<Vec<u64>>> = if levels == 0 {
        vec![Vec::new()]
    } else {
        (0..levels)
            .map(|rotation| rotation_axes(pool, &small, &large, levels, rotation))
            .collect()
    };

    rotations
        .into_iter()
        .flat_map(cartesian)
        .filter(move |factors| admissible(factors, limit))
}

/// Residual tuples over the spatial positions whose sum stays within `n + levels`.
fn residual_candidates(spatial: &[SpatialBound], n: u64, levels: usize) -> Vec<Vec<u64>> {
    let limit = n.saturating_add(levels as u64);
    let axes = spatial
        .iter()
        .map(|bound| (1..=bound.capacity).collect())
        .collect();
    cartesian(axes)
        .filter(|residuals| {
            residuals
                .iter()
                .try_fold(0u64, |sum, &r| sum.checked_add(r))
                .is_some_and(|sum| sum <= limit)
        })
        .collect()
}

/// Check one (factor tuple, spatial residual tuple) pair, both innermost first.
///
/// Returns the full residual tuple when the pair reconstructs `n` exactly.
fn solve(
    n: u64,
    factors: &[u64],
    spatial_residuals: &[u64],
    spatial: &[SpatialBound],
) -> Option<Vec<u64>> {
    let mut residuals = Vec::with_capacity(factors.len());
    let mut next_spatial = spatial.iter().zip(spatial_residuals).peekable();

    for (position, &factor) in factors.iter().enumerate() {
        match next_spatial.peek() {
            Some(&(bound, &residual)) if bound.position == position => {
                if factor > bound.capacity {
                    return None;
                }
                residuals.push(residual);
                next_spatial.next();
            }
            _ => residuals.push(factor),
        }
    }

    let mut value: u64 = 0;
    for (&factor, &residual) in factors.iter().zip(&residuals).rev() {
        if residual == 0 || residual > factor {
            return None;
        }
        value = value.checked_mul(factor)?.checked_add(residual - 1)?;
    }

    (value.checked_add(1)? == n).then_some(residuals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(factors: &ResidualFactors) -> BTreeSet<(Vec<u64>, Vec<u64>)> {
        factors
            .iter()
            .map(|d| (d.factors.clone(), d.residuals.clone()))
            .collect()
    }

    #[test]
    fn test_ten_on_four_wide_array() {
        let spatial = [SpatialBound { position: 0, capacity: 4 }];
        let factors = ResidualFactors::new(10, 2, &spatial);

        assert_eq!(factors.candidate_factors(), &[1, 2, 3, 4, 5, 6, 8, 10]);
        let expected: BTreeSet<(Vec<u64>, Vec<u64>)> = [
            (vec![4, 3], vec![4, 1]),
            (vec![3, 4], vec![3, 2]),
            (vec![10, 1], vec![10, 1]),
            (vec![5, 2], vec![5, 2]),
        ]
        .into_iter()
        .collect();
        assert_eq!(pairs(&factors), expected);
        assert_eq!(factors.len(), 4);
    }

    #[test]
    fn test_without_spatial_bounds_is_exact() {
        let factors = ResidualFactors::new(12, 2, &[]);
        let expected: BTreeSet<(Vec<u64>, Vec<u64>)> = [[1, 12], [2, 6], [3, 4], [4, 3], [6, 2], [12, 1]]
            .into_iter()
            .map(|f| (f.to_vec(), f.to_vec()))
            .collect();
        assert_eq!(pairs(&factors), expected);
    }

    #[test]
    fn test_order_one() {
        let factors = ResidualFactors::new(7, 1, &[]);
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].factors, vec![7]);
        assert_eq!(factors[0].residuals, vec![7]);
    }

    #[test]
    fn test_order_zero() {
        let factors = ResidualFactors::new(12, 0, &[]);
        assert_eq!(factors.len(), 1);
        assert!(factors[0].factors.is_empty());
        assert!(factors[0].residuals.is_empty());
    }

    #[test]
    fn test_given_outermost() {
        let given: GivenFactors = [(2, 3)].into_iter().collect();
        let factors = ResidualFactors::with_given(12, 3, &[], &given);
        assert_eq!(factors.len(), 3);
        for d in factors.iter() {
            assert_eq!(d.factors[0], 3);
            assert_eq!(d.factors.iter().product::<u64>(), 12);
            assert_eq!(d.factors, d.residuals);
        }
    }

    #[test]
    fn test_capacity_limits_spatial_factor() {
        let spatial = [SpatialBound { position: 0, capacity: 2 }];
        let factors = ResidualFactors::new(7, 2, &spatial);
        assert!(!factors.is_empty());
        for d in factors.iter() {
            // Position 0 is innermost, i.e. the last visible entry
            assert!(d.factors[1] <= 2);
            assert_eq!(d.reconstruct(), Some(6));
        }
    }

    #[test]
    fn test_zero_capacity_has_no_solutions() {
        let spatial = [SpatialBound { position: 0, capacity: 0 }];
        let factors = ResidualFactors::new(6, 2, &spatial);
        assert!(factors.is_empty());
    }

    #[test]
    fn test_spatial_validation() {
        assert_eq!(
            SpatialBound::zip(&[4, 4], &[0]),
            Err(FactorError::SpatialLengthMismatch { bounds: 2, positions: 1 })
        );

        let spatial = SpatialBound::zip(&[4, 8], &[1, 1]).unwrap();
        assert_eq!(
            ResidualFactors::try_new(10, 2, &spatial).unwrap_err(),
            FactorError::DuplicateSpatialPosition { position: 1 }
        );

        let spatial = [SpatialBound { position: 2, capacity: 4 }];
        assert_eq!(
            ResidualFactors::try_new(10, 2, &spatial).unwrap_err(),
            FactorError::SpatialPositionOutOfRange { position: 2, order: 2 }
        );
    }

    #[test]
    #[should_panic(expected = "exceed decomposition order")]
    fn test_too_many_given() {
        let given: GivenFactors = [(0, 2), (1, 3)].into_iter().collect();
        ResidualFactors::with_given(6, 1, &[], &given);
    }

    #[test]
    fn test_candidate_pool_widening() {
        let spatial = [SpatialBound { position: 0, capacity: 3 }];
        // w = 2: g = 56 adds 2 and 4; w = 3: g = 63 adds 3
        let divisors = DivisorSet::new(7);
        assert_eq!(candidate_pool(&divisors, &spatial), vec![1, 2, 3, 4, 7]);
        assert_eq!(candidate_pool(&divisors, &[]), vec![1, 7]);
    }

    #[test]
    fn test_admissible() {
        assert!(admissible(&[1, 1, 1], 0));
        assert!(admissible(&[3, 4], 6));
        assert!(!admissible(&[3, 4], 5));
        assert!(!admissible(&[u64::MAX, u64::MAX], u64::MAX));
    }

    #[test]
    fn test_rotation_axes() {
        let pool = [1, 2, 3, 4, 6];
        let small = [1, 2, 3];
        let large = [3, 4, 6];
        assert_eq!(
            rotation_axes(&pool, &small, &large, 3, 0),
            vec![pool.to_vec(), small.to_vec(), small.to_vec()]
        );
        assert_eq!(
            rotation_axes(&pool, &small, &large, 3, 2),
            vec![small.to_vec(), small.to_vec(), large.to_vec()]
        );
    }

    #[test]
    fn test_residual_candidates_sum_limit() {
        let spatial = [
            SpatialBound { position: 0, capacity: 3 },
            SpatialBound { position: 1, capacity: 3 },
        ];
        let residuals = residual_candidates(&spatial, 2, 1);
        // Sums up to 3 only
        assert_eq!(residuals, vec![vec![1, 1], vec![1, 2], vec![2, 1]]);
    }

    #[test]
    fn test_solve() {
        let spatial = [SpatialBound { position: 0, capacity: 4 }];
        assert_eq!(solve(10, &[4, 3], &[2], &spatial), Some(vec![2, 3]));
        assert_eq!(solve(10, &[4, 3], &[3], &spatial), None);
        // Residual may not exceed the factor
        assert_eq!(solve(10, &[3, 4], &[4], &spatial), None);
        // Factor may not exceed the capacity
        assert_eq!(solve(6, &[6, 1], &[1], &spatial), None);
    }

    #[test]
    fn test_reconstruct() {
        let d = ResidualDecomposition {
            factors: vec![3, 4],
            residuals: vec![3, 2],
        };
        assert_eq!(d.reconstruct(), Some(9));

        let d = ResidualDecomposition {
            factors: vec![2],
            residuals: vec![0],
        };
        assert_eq!(d.reconstruct(), None);
    }

    #[test]
    fn test_display() {
        let factors = ResidualFactors::new(7, 1, &[]);
        assert_eq!(factors.to_string(), "Co-factors of 7 are: \n    7 = 7 (residuals 7)\n");
    }
}
