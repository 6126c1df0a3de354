//! Error types for toolpath planning.

use rheopath_flow::DomainError;
use thiserror::Error;

/// Errors that can occur while planning a toolpath.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LatticeError {
    /// The flow model rejected its inputs.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Process parameters or lattice settings are inconsistent.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for lattice operations.
pub type Result<T> = std::result::Result<T, LatticeError>;
