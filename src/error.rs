// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types.
//!
//! Contract violations in the enumerators are reported through these
//! variants by the `try_*` constructors; the plain constructors panic with
//! the same message.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FactorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactorError {
    #[error("{given} given factors exceed decomposition order {order}")]
    GivenExceedsOrder { given: usize, order: usize },

    #[error("given factor position {position} is out of range for order {order}")]
    GivenPositionOutOfRange { position: usize, order: usize },

    #[error("decomposition order {order} exceeds the maximum of {max}")]
    OrderTooLarge { order: usize, max: usize },

    #[error("pruning position {position} is out of range for order {order}")]
    PrunePositionOutOfRange { position: usize, order: usize },

    #[error("{bounds} spatial bounds but {positions} spatial positions")]
    SpatialLengthMismatch { bounds: usize, positions: usize },

    #[error("spatial position {position} is out of range for order {order}")]
    SpatialPositionOutOfRange { position: usize, order: usize },

    #[error("spatial position {position} is declared more than once")]
    DuplicateSpatialPosition { position: usize },

    #[error("invalid position assignment {0:?}, expected POSITION=VALUE")]
    InvalidAssignment(String),

    #[error("unknown problem dimension {0:?}")]
    UnknownDimension(String),

    #[error("unknown data space {0:?}")]
    UnknownDataType(String),

    #[error("pattern generator bound must be positive")]
    ZeroBound,
}
