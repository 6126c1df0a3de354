//! Human-readable summary of the inputs and derived values of a run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::params::ProcessParameters;
use crate::PrintPlan;

/// Inputs and derived scalars of one run, as reported to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Lattice pitch in X (mm).
    pub deltax: f64,
    /// Lattice pitch in Y (mm).
    pub deltay: f64,
    /// Per-zone feed rates (mm/min), in traversal order.
    pub feed_rates: Vec<f64>,
    /// Flow model name.
    pub model: String,
    /// Extrusion-speed ratio (mm/min).
    pub extrusion_speed_ratio: f64,
    /// Nozzle diameter (mm).
    pub nozzle_diameter: f64,
    /// Shear rate (1/s).
    pub shear_rate: f64,
    /// Volumetric flow rate (mm³/min).
    pub flow_rate: f64,
    /// Number of moves generated.
    pub move_count: usize,
    /// Final cumulative extrusion length.
    pub total_extrusion: f64,
    /// Estimated motion time (min).
    pub motion_time_minutes: f64,
}

impl RunSummary {
    /// Collect the summary for a finished plan.
    pub fn new(params: &ProcessParameters, plan: &PrintPlan) -> Self {
        Self {
            deltax: params.deltax,
            deltay: params.deltay,
            feed_rates: plan.zones.iter().map(|z| z.feed_rate).collect(),
            model: plan.model.clone(),
            extrusion_speed_ratio: plan.flow.extrusion_speed_ratio,
            nozzle_diameter: params.nozzle_diameter,
            shear_rate: params.shear_rate,
            flow_rate: plan.flow.flow_rate,
            move_count: plan.stats.move_count,
            total_extrusion: plan.stats.total_extrusion,
            motion_time_minutes: plan.stats.motion_time_minutes,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### calculated and Input Values ###")?;
        writeln!(f, "deltax= {} mm", self.deltax)?;
        writeln!(f, "deltay= {} mm", self.deltay)?;
        for (i, feed) in self.feed_rates.iter().enumerate() {
            writeln!(f, "u{} (nozzle speed for zone {})= {} mm/min", i + 1, i + 1, feed)?;
        }
        writeln!(f, "Flow model= {}", self.model)?;
        writeln!(f, "Extrusion speed (v)= {:.5} mm/min", self.extrusion_speed_ratio)?;
        writeln!(f, "Nozzle diameter (D)= {:.5} mm", self.nozzle_diameter)?;
        writeln!(f, "Shear rate= {:.5} 1/s", self.shear_rate)?;
        writeln!(f, "Flow rate (Q)= {:.5} mm³/min", self.flow_rate)?;
        writeln!(f, "Moves= {}", self.move_count)?;
        writeln!(f, "Total extrusion (E)= {:.5}", self.total_extrusion)?;
        write!(f, "Motion time= {:.2} min", self.motion_time_minutes)
    }
}
