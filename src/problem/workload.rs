// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Workload configuration: loop bounds, data densities, stride and dilation.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::EnumCount;

use super::{DataType, Dimension, InputDimension, OutputDimension, PerProblemDimension, WeightDimension};

/// Loop bound per problem dimension.
pub type Bounds = BTreeMap<Dimension, u64>;

/// Fraction of non-zero values per data space.
pub type Densities = BTreeMap<DataType, f64>;

/// A point in the 7-dimensional iteration space.
pub type ProblemPoint = PerProblemDimension<i64>;

pub type WeightPoint = [i64; WeightDimension::COUNT];
pub type InputPoint = [i64; InputDimension::COUNT];
pub type OutputPoint = [i64; OutputDimension::COUNT];

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkloadConfig {
    bounds: Bounds,
    densities: Densities,
    w_stride: u64,
    h_stride: u64,
    w_dilation: u64,
    h_dilation: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::new(),
            densities: Densities::new(),
            w_stride: 1,
            h_stride: 1,
            w_dilation: 1,
            h_dilation: 1,
        }
    }
}

impl WorkloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound(&self, dim: Dimension) -> Option<u64> {
        self.bounds.get(&dim).copied()
    }

    pub fn density(&self, data_type: DataType) -> Option<f64> {
        self.densities.get(&data_type).copied()
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn densities(&self) -> &Densities {
        &self.densities
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn set_bound(&mut self, dim: Dimension, bound: u64) {
        self.bounds.insert(dim, bound);
    }

    pub fn set_densities(&mut self, densities: Densities) {
        self.densities = densities;
    }

    pub fn w_stride(&self) -> u64 {
        self.w_stride
    }

    pub fn set_w_stride(&mut self, stride: u64) {
        self.w_stride = stride;
    }

    pub fn h_stride(&self) -> u64 {
        self.h_stride
    }

    pub fn set_h_stride(&mut self, stride: u64) {
        self.h_stride = stride;
    }

    pub fn w_dilation(&self) -> u64 {
        self.w_dilation
    }

    pub fn set_w_dilation(&mut self, dilation: u64) {
        self.w_dilation = dilation;
    }

    pub fn h_dilation(&self) -> u64 {
        self.h_dilation
    }

    pub fn set_h_dilation(&mut self, dilation: u64) {
        self.h_dilation = dilation;
    }

    /// Bounds as a dense array; unset dimensions have bound 1.
    pub fn problem_bounds(&self) -> PerProblemDimension<u64> {
        let mut dense = PerProblemDimension::filled(1);
        for (&dim, &bound) in &self.bounds {
            dense[dim] = bound;
        }
        dense
    }

    /// Project an iteration point onto the weight tensor `(R, S, C, K)`.
    pub fn weight_point(&self, point: &ProblemPoint) -> WeightPoint {
        [
            point[Dimension::R],
            point[Dimension::S],
            point[Dimension::C],
            point[Dimension::K],
        ]
    }

    /// Project an iteration point onto the input tensor `(W, H, C, N)`.
    ///
    /// `W = w_stride * P + w_dilation * R`, and likewise `H` from `Q` and `S`.
    pub fn input_point(&self, point: &ProblemPoint) -> InputPoint {
        [
            self.w_stride as i64 * point[Dimension::P] + self.w_dilation as i64 * point[Dimension::R],
            self.h_stride as i64 * point[Dimension::Q] + self.h_dilation as i64 * point[Dimension::S],
            point[Dimension::C],
            point[Dimension::N],
        ]
    }

    /// Project an iteration point onto the output tensor `(P, Q, K, N)`.
    pub fn output_point(&self, point: &ProblemPoint) -> OutputPoint {
        [
            point[Dimension::P],
            point[Dimension::Q],
            point[Dimension::K],
            point[Dimension::N],
        ]
    }
}
