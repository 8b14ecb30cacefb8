// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Decompositions of a dimension size into tiling levels.
//!
//! # Organization
//!
//! - `given`: caller-pinned factors, shared by both enumerators
//! - `ordered`: [`Factors`], exact ordered factorizations
//! - `residual`: [`ResidualFactors`], factorizations with a boundary tile
//!
//! Both enumerators build their whole collection at construction time and
//! own it exclusively.

pub mod given;
pub mod ordered;
pub mod residual;

pub use given::{Assignment, GivenFactors};
pub use ordered::Factors;
pub use residual::{ResidualDecomposition, ResidualFactors, SpatialBound};

use std::fmt;

use crate::error::{FactorError, Result};

/// Largest supported decomposition order.
///
/// The search stack and trail grow with the order, so larger requests are
/// rejected up front.
pub const MAX_ORDER: usize = 64;

fn check_order(order: usize) -> Result<()> {
    if order > MAX_ORDER {
        return Err(FactorError::OrderTooLarge {
            order,
            max: MAX_ORDER,
        });
    }
    Ok(())
}

/// Write `a * b * c`.
fn write_product(f: &mut fmt::Formatter<'_>, factors: &[u64]) -> fmt::Result {
    for (i, factor) in factors.iter().enumerate() {
        if i > 0 {
            write!(f, " * ")?;
        }
        write!(f, "{}", factor)?;
    }
    Ok(())
}
