// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Integer and interpolation helpers.
//!
//! - `isqrt`: exact integer square root
//! - `DivisorSet`: all divisors of n, the candidate pool of both enumerators
//! - `smallest_factor` / `tiling`: near-square layouts for arrays of nodes
//! - `linear_interpolate` / `bilinear_interpolate`
//! - `pattern`: sequential and random 128-bit index streams

pub mod divisors;
pub mod pattern;

pub use divisors::DivisorSet;
pub use pattern::{PatternGenerator128, RandomGenerator128, SequenceGenerator128};

/// Integer square root, `floor(sqrt(x))`, by the bitwise digit-by-digit method.
///
/// Exact over the whole `u64` range.
pub fn isqrt(x: u64) -> u64 {
    let mut op = x;
    let mut res: u64 = 0;
    let mut one: u64 = 1 << 62;

    while one > op {
        one >>= 2;
    }

    while one != 0 {
        if op >= res + one {
            op -= res + one;
            res += one << 1;
        }
        res >>= 1;
        one >>= 2;
    }
    res
}

/// Smallest factor of `n` greater than one, and the quotient `n / factor`.
///
/// Primes (and 0, 1) return `(n, 1)`.
pub fn smallest_factor(n: u64) -> (u64, u64) {
    let mut i = 2;
    while i < n {
        if n % i == 0 {
            return (i, n / i);
        }
        // Past the square root only n itself can divide n
        if i > n / i {
            break;
        }
        i += 1;
    }
    (n, 1)
}

/// Close-to-square `(height, width)` layout of `num_elems` nodes.
///
/// Prime factors, smallest first, are dealt alternately to height and width;
/// the result is ordered so that `height <= width`.
///
/// ```
/// use tiling_factors::numeric::tiling;
///
/// assert_eq!(tiling(16), (4, 4));
/// assert_eq!(tiling(12), (2, 6));
/// assert_eq!(tiling(7), (1, 7));
/// ```
pub fn tiling(num_elems: u64) -> (u64, u64) {
    let mut factors = Vec::new();
    let mut residue = num_elems;
    while residue > 1 {
        let (factor, rest) = smallest_factor(residue);
        factors.push(factor);
        residue = rest;
    }

    let mut height = 1;
    let mut width = 1;
    for (i, factor) in factors.iter().enumerate() {
        if i % 2 == 0 {
            height *= factor;
        } else {
            width *= factor;
        }
    }

    if height > width {
        std::mem::swap(&mut height, &mut width);
    }
    (height, width)
}

/// Interpolate between `(x0, q0)` and `(x1, q1)` at `x`.
///
/// A degenerate interval (`x0 == x1`) has slope 0 and returns `q0`.
pub fn linear_interpolate(x: f64, x0: f64, x1: f64, q0: f64, q1: f64) -> f64 {
    let slope = if x0 == x1 { 0.0 } else { (q1 - q0) / (x1 - x0) };
    q0 + slope * (x - x0)
}

/// Bilinear interpolation over the rectangle `[x0, x1] x [y0, y1]`.
///
/// `qXY` is the value at corner `(xX, yY)`.
#[allow(clippy::too_many_arguments)]
pub fn bilinear_interpolate(
    x: f64,
    y: f64,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
    q00: f64,
    q01: f64,
    q10: f64,
    q11: f64,
) -> f64 {
    // Along x first, then along y
    let qx0 = linear_interpolate(x, x0, x1, q00, q10);
    let qx1 = linear_interpolate(x, x0, x1, q01, q11);
    linear_interpolate(y, y0, y1, qx0, qx1)
}
