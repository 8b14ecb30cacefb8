// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;

use tiling_factors::{Factors, ResidualFactors};

/// Every ordered k-tuple of positive integers with product `n`, by brute force.
pub fn brute_force_factorizations(n: u64, k: usize) -> BTreeSet<Vec<u64>> {
    fn extend(n: u64, k: usize, prefix: &mut Vec<u64>, out: &mut BTreeSet<Vec<u64>>) {
        if k == 0 {
            if n == 1 {
                out.insert(prefix.clone());
            }
            return;
        }
        for d in (1..=n).filter(|d| n % d == 0) {
            prefix.push(d);
            extend(n / d, k - 1, prefix, out);
            prefix.pop();
        }
    }

    let mut out = BTreeSet::new();
    extend(n, k, &mut Vec::new(), &mut out);
    out
}

pub fn tuple_set(factors: &Factors) -> BTreeSet<Vec<u64>> {
    factors.iter().map(<[u64]>::to_vec).collect()
}

/// Check every decomposition against the boundary-residual constraints.
pub fn assert_valid_residuals(factors: &ResidualFactors) {
    let n = factors.n();
    for d in factors.iter() {
        assert_eq!(d.factors.len(), factors.order());
        assert_eq!(d.residuals.len(), factors.order());
        for (&f, &r) in d.factors.iter().zip(&d.residuals) {
            assert!(1 <= r && r <= f, "residual {} outside 1..={} in {:?}", r, f, d);
        }
        assert_eq!(d.reconstruct().map(|v| v + 1), Some(n), "{:?} does not cover {}", d, n);
    }
}
