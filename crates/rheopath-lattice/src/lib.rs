#![warn(missing_docs)]

//! Lattice toolpath generation for extrusion printing.
//!
//! This crate walks a fixed lattice of stacked square perimeters, one stack
//! per zone, and emits linear moves carrying a position, a layer height, a
//! feed rate and a cumulative extrusion length. The extrusion counter is
//! shared by every zone and never resets.
//!
//! # Example
//!
//! ```
//! use rheopath_lattice::{plan, LatticeSettings, ProcessParameters};
//!
//! let params = ProcessParameters::default();
//! let result = plan(&params, &LatticeSettings::default()).unwrap();
//!
//! assert_eq!(result.path.len(), 90);
//! assert!(result.path.is_extrusion_monotonic());
//! ```

pub mod error;
pub mod extrusion;
pub mod generate;
pub mod params;
pub mod path;
pub mod summary;

pub use error::{LatticeError, Result};
pub use extrusion::{
    extrusion_increment, ExtrusionAccumulator, DEFAULT_CALIBRATION, EXTRUSION_NORMALIZATION,
};
pub use generate::generate;
pub use params::{
    ExtrusionMode, LatticeSettings, LayerSchedule, LayerTier, ProcessParameters, Zone,
    MAX_PERIMETERS,
};
pub use path::{Move, MoveKind, Path, PathStats};
pub use summary::RunSummary;

use rheopath_flow::FlowState;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Result of planning a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintPlan {
    /// Name of the flow model that produced `flow`.
    pub model: String,
    /// Derived flow scalars.
    pub flow: FlowState,
    /// Zones in traversal order.
    pub zones: Vec<Zone>,
    /// Generated toolpath.
    pub path: Path,
    /// Path statistics.
    pub stats: PathStats,
}

/// Plan a run with the reference zone layout.
///
/// This is the main entry point. It:
/// 1. Derives the flow state (propagating any `DomainError` unchanged)
/// 2. Validates parameters and settings
/// 3. Lays out one zone per feed rate
/// 4. Generates the path and its statistics
pub fn plan(params: &ProcessParameters, settings: &LatticeSettings) -> Result<PrintPlan> {
    let (model, flow) = derive_flow(params)?;
    params.validate()?;
    settings.validate()?;

    let zones = params.reference_zones(settings);
    Ok(plan_zones(model, flow, zones, params, settings))
}

/// Plan a run over an explicit zone list.
///
/// Feed rates come from the zones; `params.feed_rates` is ignored. Every
/// zone must have a finite origin and at least one perimeter.
pub fn plan_with_zones(
    params: &ProcessParameters,
    zones: Vec<Zone>,
    settings: &LatticeSettings,
) -> Result<PrintPlan> {
    let (model, flow) = derive_flow(params)?;
    let check = ProcessParameters {
        feed_rates: zones.iter().map(|z| z.feed_rate).collect(),
        ..params.clone()
    };
    check.validate()?;
    for (index, zone) in zones.iter().enumerate() {
        zone.validate(index)?;
    }
    settings.validate()?;
    Ok(plan_zones(model, flow, zones, params, settings))
}

fn derive_flow(params: &ProcessParameters) -> Result<(String, FlowState)> {
    let model = params.model.build(params.power_law_index);
    let flow = FlowState::derive(model.as_ref(), params.shear_rate, params.nozzle_diameter)?;
    Ok((model.name().to_string(), flow))
}

fn plan_zones(
    model: String,
    flow: FlowState,
    zones: Vec<Zone>,
    params: &ProcessParameters,
    settings: &LatticeSettings,
) -> PrintPlan {
    let path = generate(&zones, params.deltax, params.deltay, settings, &flow);
    let stats = path.stats();

    info!(
        zones = zones.len(),
        moves = stats.move_count,
        total_extrusion = format!("{:.5}", stats.total_extrusion),
        "Generated lattice toolpath"
    );

    PrintPlan {
        model,
        flow,
        zones,
        path,
        stats,
    }
}
