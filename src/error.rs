use thiserror::Error;

use crate::location::{CellLocation, Position};

/// Reasons a [`TopologyBuilder`](crate::TopologyBuilder) may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum BuilderInvalidReason {
    /// Custom bounds were declared for a cell outside the dimensions given to the builder.
    #[error("custom bounds declared for {0:?}, which is outside the grid")]
    FeatureOutOfBounds(CellLocation),
}

/// Errors raised while constructing a [`GridTopology`](crate::GridTopology).
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The builder entered an invalid state; every reason recorded so far is listed.
    #[error("builder is invalid: {reasons:?}")]
    InvalidBuilder {
        /// Reasons in the order they were recorded.
        reasons: Vec<BuilderInvalidReason>,
    },

    /// In strict mode, a chain of border points failed to reach a corner.
    #[error("border traced from {from:?} dead-ends at {stuck_at:?} after {steps} step(s)")]
    UnterminatedBorder {
        /// The corner the trace started from.
        from: Position,
        /// The last point reached.
        stuck_at: Position,
        /// Raw edges walked before giving up.
        steps: usize,
    },
}
