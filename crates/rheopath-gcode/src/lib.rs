#![warn(missing_docs)]

//! G-code output for rheopath toolpaths.
//!
//! This crate serializes a generated [`Path`](rheopath_lattice::Path) as one
//! `G1 X Y Z E F` line per move and reads such programs back to check that
//! the extrusion counter never runs backwards.
//!
//! # Example
//!
//! ```ignore
//! use rheopath_lattice::{plan, LatticeSettings, ProcessParameters};
//! use rheopath_gcode::{write_gcode, GcodeSettings, DEFAULT_OUTPUT_FILE};
//!
//! let result = plan(&ProcessParameters::default(), &LatticeSettings::default())?;
//! write_gcode(DEFAULT_OUTPUT_FILE, &result.path, None, &GcodeSettings::default())?;
//! ```

pub mod check;
pub mod error;
pub mod writer;

pub use check::{check_extrusion, parse_program, ExtrusionReport, ParsedMove, Regression};
pub use error::{GcodeError, Result};
pub use writer::{
    format_move, format_number, render_gcode, write_gcode, GcodeSettings, DEFAULT_OUTPUT_FILE,
    EXTRUSION_PRECISION,
};

/// Read and check a program file.
pub fn check_file(path: impl AsRef<std::path::Path>) -> Result<ExtrusionReport> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| GcodeError::IoRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(check_extrusion(&parse_program(&text)?))
}
