//! Line-oriented G-code output.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};

use rheopath_lattice::{Move, Path, RunSummary};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GcodeError, Result};

/// File name used when the caller does not choose one.
pub const DEFAULT_OUTPUT_FILE: &str = "generated_gcode_with_visualization.gcode";

/// Decimal places of the extrusion field.
pub const EXTRUSION_PRECISION: usize = 5;

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GcodeSettings {
    /// Emit the run summary as `;` comments before the first move.
    pub header: bool,
    /// Maximum decimals for X, Y, Z and F (trailing zeros are trimmed).
    pub coordinate_precision: usize,
}

impl Default for GcodeSettings {
    fn default() -> Self {
        Self {
            header: false,
            coordinate_precision: 5,
        }
    }
}

/// Format a value with at most `precision` decimals, trimming trailing zeros.
pub fn format_number(value: f64, precision: usize) -> String {
    let mut s = format!("{:.prec$}", value, prec = precision);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".into();
    }
    s
}

/// Format one move as a `G1` line (no trailing newline).
pub fn format_move(mv: &Move, settings: &GcodeSettings) -> String {
    let p = settings.coordinate_precision;
    format!(
        "G1 X{} Y{} Z{} E{:.prec$} F{}",
        format_number(mv.position.x, p),
        format_number(mv.position.y, p),
        format_number(mv.position.z, p),
        mv.extrusion,
        format_number(mv.feed_rate, p),
        prec = EXTRUSION_PRECISION
    )
}

/// Render a whole program, one move per line in generation order.
pub fn render_gcode(path: &Path, summary: Option<&RunSummary>, settings: &GcodeSettings) -> String {
    let mut out = String::with_capacity(path.len() * 48);

    if settings.header {
        if let Some(summary) = summary {
            for line in summary.to_string().lines() {
                let _ = writeln!(out, "; {line}");
            }
        }
    }

    for mv in path {
        out.push_str(&format_move(mv, settings));
        out.push('\n');
    }
    out
}

/// Write a program to `dest`.
pub fn write_gcode(
    dest: impl AsRef<std::path::Path>,
    path: &Path,
    summary: Option<&RunSummary>,
    settings: &GcodeSettings,
) -> Result<()> {
    let dest = dest.as_ref();
    let io_err = |source| GcodeError::IoWrite {
        path: dest.to_path_buf(),
        source,
    };

    let file = File::create(dest).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render_gcode(path, summary, settings).as_bytes())
        .map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    info!(path = %dest.display(), moves = path.len(), "Wrote G-code");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rheopath_lattice::{plan, ExtrusionMode, LatticeSettings, ProcessParameters};

    fn reference_program(settings: &LatticeSettings) -> String {
        let result = plan(&ProcessParameters::default(), settings).unwrap();
        render_gcode(&result.path, None, &GcodeSettings::default())
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0, 5), "5");
        assert_eq!(format_number(2.5, 5), "2.5");
        assert_eq!(format_number(0.1 + 0.2, 5), "0.3");
        assert_eq!(format_number(600.0, 5), "600");
        assert_eq!(format_number(-0.000001, 5), "0");
        assert_eq!(format_number(-1.25, 5), "-1.25");
    }

    #[test]
    fn test_reference_lines() {
        let program = reference_program(&LatticeSettings::default());
        let lines: Vec<&str> = program.lines().collect();
        assert_eq!(lines.len(), 90);
        assert_eq!(lines[0], "G1 X0 Y0 Z0 E0.00000 F600");
        assert_eq!(lines[1], "G1 X5 Y0 Z0 E0.02026 F600");
        assert_eq!(lines[2], "G1 X5 Y5 Z0 E0.04053 F600");
        assert!(lines[9].starts_with("G1 X5 Y20 Z2 E"));
        assert!(lines[29].starts_with("G1 X15 Y70 Z4 E"));
        assert!(lines[31].starts_with("G1 X30 Y0 Z0 E"));
        assert!(lines[89].starts_with("G1 X55 Y70 Z30 E"));
    }

    #[test]
    fn test_mixed_feed_program_lines() {
        let params = ProcessParameters {
            feed_rates: vec![600.0, 900.0, 1500.0],
            ..Default::default()
        };
        let result = plan(&params, &LatticeSettings::default()).unwrap();
        let program = render_gcode(&result.path, None, &GcodeSettings::default());
        let lines: Vec<&str> = program.lines().collect();

        assert_eq!(lines.len(), 90);
        assert_eq!(lines[31], "G1 X30 Y0 Z0 E0.62141 F900");
        assert_eq!(lines[89], "G1 X55 Y70 Z30 E1.24011 F1500");
    }

    #[test]
    fn test_travel_and_park_repeat_extrusion() {
        let program = reference_program(&LatticeSettings::default());
        let e: Vec<&str> = program
            .lines()
            .map(|l| l.split_whitespace().nth(4).unwrap())
            .collect();
        assert_eq!(e[30], e[29]);
        assert_eq!(e[60], e[59]);
        assert_eq!(e[89], e[88]);

        let strict = reference_program(&LatticeSettings {
            extrusion_mode: ExtrusionMode::Strict,
            ..Default::default()
        });
        let last: Vec<&str> = strict.lines().rev().take(2).collect();
        assert_ne!(
            last[0].split_whitespace().nth(4),
            last[1].split_whitespace().nth(4)
        );
    }

    #[test]
    fn test_header_comments() {
        let params = ProcessParameters::default();
        let result = plan(&params, &LatticeSettings::default()).unwrap();
        let summary = RunSummary::new(&params, &result);
        let settings = GcodeSettings {
            header: true,
            ..Default::default()
        };
        let program = render_gcode(&result.path, Some(&summary), &settings);
        assert!(program.starts_with("; ### calculated and Input Values ###\n"));
        assert_eq!(program.lines().filter(|l| l.starts_with("G1")).count(), 90);
    }

    #[test]
    fn test_write_gcode() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join(DEFAULT_OUTPUT_FILE);
        let result = plan(&ProcessParameters::default(), &LatticeSettings::default()).unwrap();
        write_gcode(&dest, &result.path, None, &GcodeSettings::default()).unwrap();

        let text = std::fs::read_to_string(&dest).unwrap();
        assert_eq!(text.lines().count(), 90);
    }

    #[test]
    fn test_write_gcode_bad_dir() {
        let result = plan(&ProcessParameters::default(), &LatticeSettings::default()).unwrap();
        let err = write_gcode(
            "/nonexistent-dir/out.gcode",
            &result.path,
            None,
            &GcodeSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GcodeError::IoWrite { .. }));
    }
}
