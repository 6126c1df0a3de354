//! Error types for plot rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering a plot.
#[derive(Error, Debug)]
pub enum PlotError {
    /// There is nothing to draw.
    #[error("no points to plot")]
    Empty,

    /// A coordinate is NaN or infinite.
    #[error("point {0} is not finite")]
    NonFinite(usize),

    /// Writing the file failed.
    #[error("failed to write {path}: {source}")]
    IoWrite {
        /// Destination file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for plot operations.
pub type Result<T> = std::result::Result<T, PlotError>;
