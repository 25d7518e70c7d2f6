use thiserror::Error;

use crate::geometry::GeometryError;

/// A reading that cannot be computed because the meter or the state it
/// describes is physically invalid.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum FlowError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("upstream absolute pressure {0} psia must be finite and positive")]
    InvalidPressure(f64),

    #[error("expansion factor {0} must be finite and positive")]
    ExpansionFactor(f64),

    #[error("discharge coefficient diverged after {iters} iterations")]
    Diverged { iters: usize },
}
