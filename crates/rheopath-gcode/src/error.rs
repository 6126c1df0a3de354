//! Error types for G-code output and checking.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from writing or reading G-code.
#[derive(Error, Debug)]
pub enum GcodeError {
    /// Writing the program failed.
    #[error("failed to write {path}: {source}")]
    IoWrite {
        /// Destination file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Reading a program failed.
    #[error("failed to read {path}: {source}")]
    IoRead {
        /// Source file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A move line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },
}

/// Result type for G-code operations.
pub type Result<T> = std::result::Result<T, GcodeError>;
