//! Error types for the flow model.

use thiserror::Error;

/// Inputs that leave the flow formulas undefined.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The power-law index drives `3n + 1` to zero.
    #[error("power-law index {0} makes 3n + 1 vanish")]
    SingularPowerLawIndex(f64),

    /// Nozzle diameter is zero or negative.
    #[error("nozzle diameter must be positive, got {0}")]
    NonPositiveDiameter(f64),

    /// Nozzle radius is zero or negative.
    #[error("nozzle radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    /// An input is NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NonFinite {
        /// Name of the offending input.
        name: &'static str,
        /// The value that was supplied.
        value: f64,
    },
}

/// Result type for flow model operations.
pub type Result<T> = std::result::Result<T, DomainError>;

pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFinite { name, value })
    }
}
