#![warn(missing_docs)]

//! Rheology-to-kinematics conversion for paste and gel extrusion.
//!
//! A wall shear rate and a fluid model give the volumetric flow the nozzle
//! must deliver; dividing by the nozzle cross-section gives the
//! extrusion-speed ratio the toolpath generator consumes.
//!
//! # Example
//!
//! ```
//! use rheopath_flow::{FlowState, PowerLaw};
//!
//! let flow = FlowState::derive(&PowerLaw::new(1.0), 50.0, 0.4).unwrap();
//! assert!((flow.extrusion_speed_ratio - 150.0).abs() < 1e-9);
//! ```

pub mod error;
pub mod model;

pub use error::{DomainError, Result};
pub use model::{
    extrusion_speed_ratio, flow_rate, FlowModel, ModelKind, Newtonian, PowerLaw,
    SECONDS_PER_MINUTE,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scalars derived once from the process parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    /// Nozzle radius (mm).
    pub nozzle_radius: f64,
    /// Volumetric flow rate (mm³/min).
    pub flow_rate: f64,
    /// Extrusion-speed ratio (mm/min).
    pub extrusion_speed_ratio: f64,
}

impl FlowState {
    /// Run the flow model and the speed-ratio conversion.
    pub fn derive(model: &dyn FlowModel, shear_rate: f64, nozzle_diameter: f64) -> Result<Self> {
        let flow_rate = model.flow_rate(shear_rate, nozzle_diameter)?;
        let nozzle_radius = nozzle_diameter / 2.0;
        let extrusion_speed_ratio = extrusion_speed_ratio(flow_rate, nozzle_radius)?;

        debug!(
            model = model.name(),
            flow_rate,
            extrusion_speed_ratio,
            "Derived flow state"
        );

        Ok(Self {
            nozzle_radius,
            flow_rate,
            extrusion_speed_ratio,
        })
    }

    /// Nozzle cross-section area (mm²).
    pub fn nozzle_area(&self) -> f64 {
        std::f64::consts::PI * self.nozzle_radius.powi(2)
    }
}
