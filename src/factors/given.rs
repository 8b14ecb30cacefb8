// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Caller-pinned factors ("given assignments").
//!
//! A given assignment fixes the factor at some tuple positions before
//! enumeration. Both enumerators validate it the same way and splice the
//! accepted values back into every generated tuple.

use std::collections::BTreeMap;
use std::str::FromStr;

use tracing::warn;

use crate::error::{FactorError, Result};

/// Map from tuple position to a fixed factor value.
///
/// Positions are kept sorted; validation and splicing both walk them in
/// ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GivenFactors {
    factors: BTreeMap<usize, u64>,
}

impl GivenFactors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `value` at `position`, replacing any earlier value there.
    pub fn insert(&mut self, position: usize, value: u64) -> &mut Self {
        self.factors.insert(position, value);
        self
    }

    pub fn get(&self, position: usize) -> Option<u64> {
        self.factors.get(&position).copied()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// `(position, value)` pairs in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.factors.iter().map(|(&p, &v)| (p, v))
    }

    /// Check the assignment against a decomposition of `order` levels.
    pub(crate) fn check_order(&self, order: usize) -> Result<()> {
        if self.len() > order {
            return Err(FactorError::GivenExceedsOrder {
                given: self.len(),
                order,
            });
        }
        match self.factors.keys().find(|&&p| p >= order) {
            Some(&position) => Err(FactorError::GivenPositionOutOfRange { position, order }),
            None => Ok(()),
        }
    }

    /// Keep the entries that divide `n` given the running partial product.
    ///
    /// Entries are visited in ascending position order. An entry is accepted
    /// when `value * partial_product` divides `n`, and then joins the partial
    /// product. Rejected entries become free positions and are reported with
    /// a warning; they never fail the enumeration.
    ///
    /// Returns the accepted entries and their product.
    pub(crate) fn validate(&self, n: u64) -> (GivenFactors, u64) {
        let mut accepted = GivenFactors::new();
        let mut partial_product: u64 = 1;

        for (position, value) in self.iter() {
            match value.checked_mul(partial_product) {
                Some(product) if product != 0 && n % product == 0 => {
                    partial_product = product;
                    accepted.insert(position, value);
                }
                _ => {
                    warn!(
                        n,
                        position,
                        factor = value,
                        partial_product,
                        "cannot accept given factor; treating position as a free variable"
                    );
                }
            }
        }
        (accepted, partial_product)
    }

    /// Insert the pinned values into `tuple` at their declared positions.
    ///
    /// Ascending insertion means every declared position is an index of the
    /// final tuple, with free entries shifted right around it.
    ///
    /// # Panics
    ///
    /// Panics if a position lies beyond the end of the tuple being built.
    pub(crate) fn splice_into(&self, tuple: &mut Vec<u64>) {
        for (position, value) in self.iter() {
            assert!(
                position <= tuple.len(),
                "given position {} beyond tuple of length {}",
                position,
                tuple.len()
            );
            tuple.insert(position, value);
        }
    }
}

impl FromIterator<(usize, u64)> for GivenFactors {
    fn from_iter<I: IntoIterator<Item = (usize, u64)>>(iter: I) -> Self {
        Self {
            factors: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<usize, u64>> for GivenFactors {
    fn from(factors: BTreeMap<usize, u64>) -> Self {
        Self { factors }
    }
}

/// A `POSITION=VALUE` pair, as written on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub position: usize,
    pub value: u64,
}

impl FromStr for Assignment {
    type Err = FactorError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FactorError::InvalidAssignment(s.to_string());
        let (position, value) = s.split_once('=').ok_or_else(invalid)?;
        Ok(Self {
            position: position.trim().parse().map_err(|_| invalid())?,
            value: value.trim().parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_dividing_factors() {
        let given: GivenFactors = [(0, 2), (2, 3)].into_iter().collect();
        let (accepted, product) = given.validate(12);
        assert_eq!(accepted, given);
        assert_eq!(product, 6);
    }

    #[test]
    fn test_validate_drops_non_divisor() {
        let given: GivenFactors = [(0, 5), (1, 4)].into_iter().collect();
        let (accepted, product) = given.validate(12);
        assert_eq!(accepted.iter().collect::<Vec<_>>(), vec![(1, 4)]);
        assert_eq!(product, 4);
    }

    #[test]
    fn test_validate_uses_partial_product() {
        // 4 divides 12 and 6 divides 12, but 4 * 6 does not
        let given: GivenFactors = [(0, 4), (1, 6)].into_iter().collect();
        let (accepted, product) = given.validate(12);
        assert_eq!(accepted.iter().collect::<Vec<_>>(), vec![(0, 4)]);
        assert_eq!(product, 4);
    }

    #[test]
    fn test_validate_rejects_zero_and_overflow() {
        let given: GivenFactors = [(0, 0), (1, u64::MAX), (2, u64::MAX)].into_iter().collect();
        let (accepted, product) = given.validate(u64::MAX);
        assert_eq!(accepted.iter().collect::<Vec<_>>(), vec![(1, u64::MAX)]);
        assert_eq!(product, u64::MAX);
    }

    #[test]
    fn test_check_order() {
        let given: GivenFactors = [(0, 2), (1, 3)].into_iter().collect();
        assert!(given.check_order(2).is_ok());
        assert_eq!(
            given.check_order(1),
            Err(FactorError::GivenExceedsOrder { given: 2, order: 1 })
        );

        let given: GivenFactors = [(3, 2)].into_iter().collect();
        assert_eq!(
            given.check_order(3),
            Err(FactorError::GivenPositionOutOfRange { position: 3, order: 3 })
        );
    }

    #[test]
    fn test_splice_keeps_declared_positions() {
        let given: GivenFactors = [(0, 7), (2, 9)].into_iter().collect();
        let mut tuple = vec![1, 2];
        given.splice_into(&mut tuple);
        assert_eq!(tuple, vec![7, 1, 9, 2]);
    }

    #[test]
    fn test_splice_at_end() {
        let given: GivenFactors = [(2, 5)].into_iter().collect();
        let mut tuple = vec![1, 2];
        given.splice_into(&mut tuple);
        assert_eq!(tuple, vec![1, 2, 5]);
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            "1=4".parse::<Assignment>(),
            Ok(Assignment { position: 1, value: 4 })
        );
        assert_eq!(
            " 0 = 16 ".parse::<Assignment>(),
            Ok(Assignment { position: 0, value: 16 })
        );
        assert!("1:4".parse::<Assignment>().is_err());
        assert!("x=4".parse::<Assignment>().is_err());
    }
}
