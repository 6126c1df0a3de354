//! Reading back `G1` programs and checking the extrusion counter.
//!
//! Only linear moves are interpreted. Comments (`;` to end of line) and
//! other commands are skipped.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GcodeError, Result};

/// A linear move read from a program. Absent words are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedMove {
    /// 1-based source line.
    pub line: usize,
    /// X word.
    pub x: Option<f64>,
    /// Y word.
    pub y: Option<f64>,
    /// Z word.
    pub z: Option<f64>,
    /// E word (absolute extrusion).
    pub e: Option<f64>,
    /// F word.
    pub f: Option<f64>,
}

/// Parse every `G0`/`G1` line of a program.
pub fn parse_program(text: &str) -> Result<Vec<ParsedMove>> {
    let mut moves = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let code = raw.split(';').next().unwrap_or("").trim();
        let mut words = code.split_whitespace();

        match words.next() {
            Some(cmd) if cmd.eq_ignore_ascii_case("G1") || cmd.eq_ignore_ascii_case("G0") => {}
            _ => continue,
        }

        let mut mv = ParsedMove {
            line,
            ..Default::default()
        };
        for word in words {
            let mut chars = word.chars();
            let Some(letter) = chars.next() else {
                continue;
            };
            let value: f64 = chars.as_str().parse().map_err(|_| GcodeError::Parse {
                line,
                message: format!("invalid number in word '{word}'"),
            })?;
            match letter.to_ascii_uppercase() {
                'X' => mv.x = Some(value),
                'Y' => mv.y = Some(value),
                'Z' => mv.z = Some(value),
                'E' => mv.e = Some(value),
                'F' => mv.f = Some(value),
                _ => {}
            }
        }
        moves.push(mv);
    }

    Ok(moves)
}

/// A place where the extrusion counter went backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    /// Line of the offending move.
    pub line: usize,
    /// Extrusion value before the move.
    pub previous: f64,
    /// Extrusion value of the move.
    pub value: f64,
}

/// Result of checking a program's extrusion counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionReport {
    /// Number of linear moves read.
    pub moves: usize,
    /// Moves that advanced the counter.
    pub extruding: usize,
    /// Moves that repeated the counter.
    pub holding: usize,
    /// Last extrusion value seen.
    pub final_extrusion: f64,
    /// Every decrease of the counter.
    pub regressions: Vec<Regression>,
}

impl ExtrusionReport {
    /// No regressions were found.
    pub fn is_ok(&self) -> bool {
        self.regressions.is_empty()
    }
}

impl fmt::Display for ExtrusionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Moves: {}", self.moves)?;
        writeln!(f, "  Extruding: {}", self.extruding)?;
        writeln!(f, "  Holding: {}", self.holding)?;
        writeln!(f, "Final extrusion: {:.5}", self.final_extrusion)?;
        if self.is_ok() {
            write!(f, "Extrusion is non-decreasing")
        } else {
            write!(f, "Regressions: {}", self.regressions.len())?;
            for r in &self.regressions {
                write!(f, "\n  line {}: {:.5} -> {:.5}", r.line, r.previous, r.value)?;
            }
            Ok(())
        }
    }
}

/// Check that E never decreases. Moves without an E word are skipped.
pub fn check_extrusion(moves: &[ParsedMove]) -> ExtrusionReport {
    let mut report = ExtrusionReport {
        moves: moves.len(),
        ..Default::default()
    };
    let mut previous: Option<f64> = None;

    for mv in moves {
        let Some(e) = mv.e else {
            continue;
        };
        if let Some(prev) = previous {
            if e > prev {
                report.extruding += 1;
            } else if e == prev {
                report.holding += 1;
            } else {
                warn!(line = mv.line, previous = prev, value = e, "Extrusion decreased");
                report.regressions.push(Regression {
                    line: mv.line,
                    previous: prev,
                    value: e,
                });
            }
        }
        previous = Some(e);
        report.final_extrusion = e;
    }

    report
}
