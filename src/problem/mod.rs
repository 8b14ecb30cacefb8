// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Workload shapes for a 7-dimensional convolution layer.
//!
//! A layer is described by its loop bounds (`R S P Q C K N`) and by the
//! three data spaces it touches (weights, inputs, outputs). The factor
//! enumerators take one bound at a time from a [`WorkloadConfig`].

pub mod workload;

pub use workload::{Bounds, Densities, ProblemPoint, WorkloadConfig};

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

use crate::error::FactorError;

/// Data spaces of a convolution.
#[derive(
    Debug, EnumCountMacro, EnumIter, IntoStaticStr, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataType {
    #[strum(serialize = "Weights")]
    Weight,
    #[strum(serialize = "Inputs")]
    Input,
    #[strum(serialize = "Outputs")]
    Output,
}

impl DataType {
    /// Whether the data space is updated in place (partial sums).
    pub fn is_read_write(self) -> bool {
        self == DataType::Output
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for DataType {
    type Err = FactorError;

    fn from_str(s: &str) -> Result<Self, FactorError> {
        DataType::iter()
            .find(|data_type| data_type.name() == s)
            .ok_or_else(|| FactorError::UnknownDataType(s.to_string()))
    }
}

/// Loop dimensions of a convolution.
///
/// `R S`: filter width and height, `P Q`: output width and height,
/// `C`: input channels, `K`: output channels, `N`: batch.
#[derive(
    Debug, EnumCountMacro, EnumIter, IntoStaticStr, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dimension {
    R,
    S,
    P,
    Q,
    C,
    K,
    N,
}

impl Dimension {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Look a dimension up by its single-letter name.
    pub fn from_char(c: char) -> Result<Self, FactorError> {
        Dimension::iter()
            .find(|dim| dim.name().starts_with(c))
            .ok_or_else(|| FactorError::UnknownDimension(c.to_string()))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Dimension {
    type Err = FactorError;

    fn from_str(s: &str) -> Result<Self, FactorError> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Dimension::from_char(c),
            _ => Err(FactorError::UnknownDimension(s.to_string())),
        }
    }
}

/// Coordinates of the weight tensor.
#[derive(Debug, EnumCountMacro, EnumIter, Copy, Clone, PartialEq, Eq)]
pub enum WeightDimension {
    R,
    S,
    C,
    K,
}

impl WeightDimension {
    pub fn dimension(self) -> Dimension {
        match self {
            WeightDimension::R => Dimension::R,
            WeightDimension::S => Dimension::S,
            WeightDimension::C => Dimension::C,
            WeightDimension::K => Dimension::K,
        }
    }
}

/// Coordinates of the input tensor.
///
/// `W` and `H` are derived from output position, filter offset, stride and
/// dilation; see [`WorkloadConfig::input_point`].
#[derive(Debug, EnumCountMacro, EnumIter, Copy, Clone, PartialEq, Eq)]
pub enum InputDimension {
    W,
    H,
    C,
    N,
}

/// Coordinates of the output tensor.
#[derive(Debug, EnumCountMacro, EnumIter, Copy, Clone, PartialEq, Eq)]
pub enum OutputDimension {
    P,
    Q,
    K,
    N,
}

impl OutputDimension {
    pub fn dimension(self) -> Dimension {
        match self {
            OutputDimension::P => Dimension::P,
            OutputDimension::Q => Dimension::Q,
            OutputDimension::K => Dimension::K,
            OutputDimension::N => Dimension::N,
        }
    }
}

/// One value per data space, indexed by [`DataType`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerDataSpace<T> {
    values: [T; DataType::COUNT],
}

impl<T> PerDataSpace<T> {
    pub fn new(values: [T; DataType::COUNT]) -> Self {
        Self { values }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DataType, &T)> + '_ {
        DataType::iter().zip(self.values.iter())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Largest value across data spaces.
    pub fn max(&self) -> &T
    where
        T: PartialOrd,
    {
        largest(&self.values)
    }
}

impl<T: Clone> PerDataSpace<T> {
    pub fn filled(value: T) -> Self {
        Self {
            values: std::array::from_fn(|_| value.clone()),
        }
    }
}

impl<T> Index<DataType> for PerDataSpace<T> {
    type Output = T;

    fn index(&self, data_type: DataType) -> &T {
        &self.values[data_type as usize]
    }
}

impl<T> IndexMut<DataType> for PerDataSpace<T> {
    fn index_mut(&mut self, data_type: DataType) -> &mut T {
        &mut self.values[data_type as usize]
    }
}

impl<T: fmt::Display> fmt::Display for PerDataSpace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (data_type, value) in self.iter() {
            writeln!(f, "{:>10}: {}", data_type, value)?;
        }
        Ok(())
    }
}

/// One value per problem dimension, indexed by [`Dimension`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerProblemDimension<T> {
    values: [T; Dimension::COUNT],
}

impl<T> PerProblemDimension<T> {
    pub fn new(values: [T; Dimension::COUNT]) -> Self {
        Self { values }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &T)> + '_ {
        Dimension::iter().zip(self.values.iter())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn max(&self) -> &T
    where
        T: PartialOrd,
    {
        largest(&self.values)
    }
}

impl<T: Clone> PerProblemDimension<T> {
    pub fn filled(value: T) -> Self {
        Self {
            values: std::array::from_fn(|_| value.clone()),
        }
    }
}

impl<T> Index<Dimension> for PerProblemDimension<T> {
    type Output = T;

    fn index(&self, dim: Dimension) -> &T {
        &self.values[dim as usize]
    }
}

impl<T> IndexMut<Dimension> for PerProblemDimension<T> {
    fn index_mut(&mut self, dim: Dimension) -> &mut T {
        &mut self.values[dim as usize]
    }
}

impl<T: fmt::Display> fmt::Display for PerProblemDimension<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (dim, value) in self.iter() {
            writeln!(f, "{}: {}", dim, value)?;
        }
        Ok(())
    }
}

/// First maximal element; the arrays are indexed by non-empty enums.
fn largest<T: PartialOrd, const N: usize>(values: &[T; N]) -> &T {
    values[1..]
        .iter()
        .fold(&values[0], |best, v| if v > best { v } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_names() {
        assert_eq!(DataType::Weight.name(), "Weights");
        assert_eq!("Outputs".parse::<DataType>(), Ok(DataType::Output));
        assert_eq!(
            "Psums".parse::<DataType>(),
            Err(FactorError::UnknownDataType("Psums".to_string()))
        );
        assert_eq!(format!("{:>10}", DataType::Input), "    Inputs");
    }

    #[test]
    fn test_read_write() {
        let read_write: Vec<DataType> = DataType::iter().filter(|d| d.is_read_write()).collect();
        assert_eq!(read_write, vec![DataType::Output]);
    }

    #[test]
    fn test_dimension_lookup() {
        assert_eq!(Dimension::from_char('Q'), Ok(Dimension::Q));
        assert_eq!("K".parse::<Dimension>(), Ok(Dimension::K));
        assert!(Dimension::from_char('W').is_err());
        assert!("RS".parse::<Dimension>().is_err());
        assert_eq!(Dimension::COUNT, 7);
    }

    #[test]
    fn test_tensor_dimensions() {
        let weights: Vec<Dimension> = WeightDimension::iter().map(WeightDimension::dimension).collect();
        assert_eq!(weights, vec![Dimension::R, Dimension::S, Dimension::C, Dimension::K]);
        assert_eq!(InputDimension::COUNT, 4);
        assert_eq!(OutputDimension::K.dimension(), Dimension::K);
    }

    #[test]
    fn test_per_data_space() {
        let mut sizes = PerDataSpace::new([10u64, 30, 20]);
        assert_eq!(sizes[DataType::Input], 30);
        assert_eq!(*sizes.max(), 30);

        sizes[DataType::Output] = 40;
        assert_eq!(*sizes.max(), 40);
        assert_eq!(
            sizes.to_string(),
            "   Weights: 10\n    Inputs: 30\n   Outputs: 40\n"
        );
    }

    #[test]
    fn test_per_problem_dimension() {
        let mut bounds = PerProblemDimension::filled(1u64);
        bounds[Dimension::C] = 64;
        bounds[Dimension::K] = 128;
        assert_eq!(*bounds.max(), 128);
        assert_eq!(bounds.iter().filter(|&(_, &v)| v == 1).count(), 5);
        assert!(bounds.to_string().starts_with("R: 1\nS: 1\nP: 1\nQ: 1\nC: 64\n"));
    }

    #[test]
    fn test_max_picks_first_of_ties() {
        let densities = PerDataSpace::new([0.5f64, 1.0, 1.0]);
        assert_eq!(*densities.max(), 1.0);
    }
}
