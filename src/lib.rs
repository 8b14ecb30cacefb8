// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Enumerate the ways a loop bound can be split across tiling levels.
//!
//! A mapper for a spatial accelerator tiles every loop of a workload over a
//! hierarchy of buffers and processing-element arrays. For one loop of size
//! `n` and `k` levels this crate builds the candidate tilings:
//!
//! - [`Factors`]: every ordered tuple `(f_1, ..., f_k)` with product `n`,
//!   optionally with some positions pinned and others capped.
//! - [`ResidualFactors`]: (factor, residual) pairs that cover `n` exactly
//!   even when `n` does not divide evenly, by letting the last iteration of
//!   a level use only part of its tile.
//!
//! # Architecture
//!
//! The ordered enumerator runs on a small backtracking engine:
//!
//! - [`Trail`]: records slot changes for O(1) backtracking
//! - [`SearchEngine`]: an explicit stack of [`Predicate`]s; each predicate
//!   offers a number of choices, and failure rewinds the trail to the last
//!   choice point
//!
//! Each tiling level is one round of the split predicate, and a terminal
//! predicate records the completed tuple and fails, forcing exhaustive
//! enumeration.
//!
//! The residual enumerator is a generate-and-test over lazy Cartesian
//! products of a candidate pool; see [`factors::residual`].
//!
//! Supporting modules:
//!
//! - [`numeric`]: divisors, integer square root, tiling aspect ratios,
//!   interpolation and 128-bit index pattern generators
//! - [`problem`]: convolution workload shapes that supply the loop bounds
//!
//! # Example
//!
//! ```
//! use tiling_factors::Factors;
//!
//! let factors = Factors::new(12, 2);
//! assert_eq!(factors.len(), 6);
//! assert!(factors.iter().all(|t| t.iter().product::<u64>() == 12));
//! ```

pub mod engine;
pub mod error;
pub mod factors;
pub mod numeric;
pub mod problem;
pub mod statistics;
pub mod trail;

// Re-export commonly used types
pub use engine::{Predicate, PredicateResult, SearchEngine};
pub use error::{FactorError, Result};
pub use factors::{
    Assignment, Factors, GivenFactors, ResidualDecomposition, ResidualFactors, SpatialBound,
    MAX_ORDER,
};
pub use numeric::DivisorSet;
pub use statistics::{Counters, Statistics};
pub use trail::Trail;
