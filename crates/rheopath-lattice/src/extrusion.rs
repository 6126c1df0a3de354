//! Extrusion-length accumulation.
//!
//! Extrusion is a running integral: each move adds the increment for the
//! segment it traverses to the previous total. It is never recomputed from
//! absolute position.

use std::f64::consts::PI;

use rheopath_flow::FlowState;

/// Default calibration constant `K` (unit conversion and width correction).
pub const DEFAULT_CALIBRATION: f64 = 3.87;

/// Fixed divisor of the extrusion update.
pub const EXTRUSION_NORMALIZATION: f64 = 30.0;

/// Extrusion added by one segment of template length `delta` at `feed_rate`.
///
/// `K · (delta / u) · π R² · v / 30`
pub fn extrusion_increment(delta: f64, feed_rate: f64, flow: &FlowState, calibration: f64) -> f64 {
    (calibration * (delta / feed_rate) * PI * flow.nozzle_radius.powi(2) * flow.extrusion_speed_ratio)
        / EXTRUSION_NORMALIZATION
}

/// Running extrusion total shared by every zone of a path.
#[derive(Debug, Clone)]
pub struct ExtrusionAccumulator {
    total: f64,
    flow: FlowState,
    calibration: f64,
}

impl ExtrusionAccumulator {
    /// Start a new accumulator at zero.
    pub fn new(flow: FlowState, calibration: f64) -> Self {
        Self {
            total: 0.0,
            flow,
            calibration,
        }
    }

    /// Add the increment for one extruding segment and return the new total.
    pub fn advance(&mut self, delta: f64, feed_rate: f64) -> f64 {
        self.total += extrusion_increment(delta, feed_rate, &self.flow, self.calibration);
        self.total
    }

    /// Current total, unchanged (non-extruding move).
    pub fn hold(&self) -> f64 {
        self.total
    }
}
