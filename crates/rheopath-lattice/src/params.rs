//! Process parameters, zone layout and lattice settings.

use nalgebra::Point2;
use rheopath_flow::ModelKind;
use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};
use crate::extrusion::DEFAULT_CALIBRATION;

/// Operator-supplied inputs for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessParameters {
    /// Lattice pitch in X (mm).
    pub deltax: f64,
    /// Lattice pitch in Y (mm).
    pub deltay: f64,
    /// Nozzle diameter (mm).
    pub nozzle_diameter: f64,
    /// Wall shear rate (1/s).
    pub shear_rate: f64,
    /// Power-law flow behaviour index.
    pub power_law_index: f64,
    /// Feed rate for each zone, left to right (mm/min).
    pub feed_rates: Vec<f64>,
    /// Fluid model used to derive the flow rate.
    #[serde(default)]
    pub model: ModelKind,
}

impl Default for ProcessParameters {
    fn default() -> Self {
        Self {
            deltax: 5.0,
            deltay: 5.0,
            nozzle_diameter: 0.4,
            shear_rate: 50.0,
            power_law_index: 1.0,
            feed_rates: vec![600.0; 3],
            model: ModelKind::PowerLaw,
        }
    }
}

impl ProcessParameters {
    /// Validate the geometric and kinematic inputs.
    ///
    /// The flow model rejects inputs that leave its formulas undefined; this
    /// additionally rejects a non-positive power-law index, which would make
    /// the flow (and every extrusion increment) negative.
    pub fn validate(&self) -> Result<()> {
        if !(self.deltax.is_finite() && self.deltax > 0.0) {
            return Err(LatticeError::InvalidSettings(
                "deltax must be a positive number".into(),
            ));
        }
        if !(self.deltay.is_finite() && self.deltay > 0.0) {
            return Err(LatticeError::InvalidSettings(
                "deltay must be a positive number".into(),
            ));
        }
        if self.feed_rates.is_empty() {
            return Err(LatticeError::InvalidSettings(
                "at least one zone feed rate is required".into(),
            ));
        }
        if let Some((idx, rate)) = self
            .feed_rates
            .iter()
            .enumerate()
            .find(|(_, r)| !(r.is_finite() && **r > 0.0))
        {
            return Err(LatticeError::InvalidSettings(format!(
                "feed rate for zone {} must be positive, got {}",
                idx + 1,
                rate
            )));
        }
        if self.model == ModelKind::PowerLaw
            && !(self.power_law_index.is_finite() && self.power_law_index > 0.0)
        {
            return Err(LatticeError::InvalidSettings(format!(
                "power_law_index must be positive, got {}",
                self.power_law_index
            )));
        }
        if !(self.shear_rate.is_finite() && self.shear_rate >= 0.0) {
            return Err(LatticeError::InvalidSettings(
                "shear_rate must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Zone layout of the reference lattice: one zone per feed rate, placed
    /// side by side with a gutter between them.
    pub fn reference_zones(&self, settings: &LatticeSettings) -> Vec<Zone> {
        let stride = self.deltax + settings.gutter;
        self.feed_rates
            .iter()
            .enumerate()
            .map(|(i, &feed_rate)| Zone {
                origin: Point2::new(i as f64 * stride, 0.0),
                feed_rate,
                perimeters: settings.perimeters_per_zone,
            })
            .collect()
    }
}

/// Upper bound on stacked perimeters per zone.
pub const MAX_PERIMETERS: u32 = 10_000;

/// A region of the lattice printed at one feed rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Lower-left corner of the perimeter stack.
    pub origin: Point2<f64>,
    /// Feed rate for every move owned by this zone (mm/min).
    pub feed_rate: f64,
    /// Number of stacked perimeters.
    pub perimeters: u32,
}

impl Zone {
    /// Check one zone of an explicit layout; `index` is 0-based.
    pub fn validate(&self, index: usize) -> Result<()> {
        if !(self.origin.x.is_finite() && self.origin.y.is_finite()) {
            return Err(LatticeError::InvalidSettings(format!(
                "origin of zone {} must be finite",
                index + 1
            )));
        }
        if !(self.feed_rate.is_finite() && self.feed_rate > 0.0) {
            return Err(LatticeError::InvalidSettings(format!(
                "feed rate for zone {} must be positive, got {}",
                index + 1,
                self.feed_rate
            )));
        }
        if self.perimeters == 0 || self.perimeters > MAX_PERIMETERS {
            return Err(LatticeError::InvalidSettings(format!(
                "zone {} needs between 1 and {MAX_PERIMETERS} perimeters, got {}",
                index + 1,
                self.perimeters
            )));
        }
        Ok(())
    }
}

/// One Z tier of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTier {
    /// Number of consecutive edges printed at this height.
    pub edges: usize,
    /// Z height (mm).
    pub height: f64,
}

/// Maps the index of an edge within a zone's stack to its Z height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerSchedule {
    /// Tiers in print order.
    pub tiers: Vec<LayerTier>,
}

impl Default for LayerSchedule {
    fn default() -> Self {
        Self::reference()
    }
}

impl LayerSchedule {
    /// Schedule of the reference lattice: 8 edges at Z0, then 10 at Z2 and
    /// 10 at Z4.
    pub fn reference() -> Self {
        Self {
            tiers: vec![
                LayerTier { edges: 8, height: 0.0 },
                LayerTier { edges: 10, height: 2.0 },
                LayerTier { edges: 10, height: 4.0 },
            ],
        }
    }

    /// `tier_count` tiers of `edges_per_tier` edges, starting at Z0 and
    /// stepping by `layer_height`.
    pub fn uniform(edges_per_tier: usize, layer_height: f64, tier_count: usize) -> Self {
        Self {
            tiers: (0..tier_count)
                .map(|i| LayerTier {
                    edges: edges_per_tier,
                    height: i as f64 * layer_height,
                })
                .collect(),
        }
    }

    /// Tier index for an edge. Edges past the schedule stay on the last tier.
    pub fn tier_at(&self, edge: usize) -> usize {
        let mut end = 0;
        for (idx, tier) in self.tiers.iter().enumerate() {
            end += tier.edges;
            if edge < end {
                return idx;
            }
        }
        self.tiers.len().saturating_sub(1)
    }

    /// Z height for an edge.
    pub fn height_at(&self, edge: usize) -> f64 {
        self.tiers
            .get(self.tier_at(edge))
            .map_or(0.0, |tier| tier.height)
    }

    /// Total number of edges covered by explicit tiers.
    pub fn edge_count(&self) -> usize {
        self.tiers.iter().map(|t| t.edges).sum()
    }
}

/// Extrusion bookkeeping at zone changes and at the park move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtrusionMode {
    /// Match the reference lattice program byte for byte.
    ///
    /// Travel moves print the held value while the counter still advances
    /// behind them (by `deltay` on even transitions, `deltax` on odd ones),
    /// and the park move repeats the previous value.
    #[default]
    ReferenceCompatible,
    /// Pure running integral: travels hold, the park move extrudes its own
    /// `deltax` increment.
    Strict,
}

/// Lattice shape and extrusion calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeSettings {
    /// Perimeters stacked in each zone of the reference layout.
    pub perimeters_per_zone: u32,
    /// Gap between neighbouring zones (mm).
    pub gutter: f64,
    /// Z tiers of each zone's stack.
    pub layers: LayerSchedule,
    /// Z height of the final park move (mm).
    pub park_height: f64,
    /// Calibration constant `K` of the extrusion update.
    pub calibration: f64,
    /// Extrusion bookkeeping at zone changes and at the park move.
    pub extrusion_mode: ExtrusionMode,
}

impl Default for LatticeSettings {
    fn default() -> Self {
        Self {
            perimeters_per_zone: 7,
            gutter: 20.0,
            layers: LayerSchedule::reference(),
            park_height: 30.0,
            calibration: DEFAULT_CALIBRATION,
            extrusion_mode: ExtrusionMode::ReferenceCompatible,
        }
    }
}

impl LatticeSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.perimeters_per_zone == 0 || self.perimeters_per_zone > MAX_PERIMETERS {
            return Err(LatticeError::InvalidSettings(format!(
                "perimeters_per_zone must be between 1 and {MAX_PERIMETERS}, got {}",
                self.perimeters_per_zone
            )));
        }
        if !(self.gutter.is_finite() && self.gutter >= 0.0) {
            return Err(LatticeError::InvalidSettings(
                "gutter must be non-negative".into(),
            ));
        }
        if !(self.calibration.is_finite() && self.calibration > 0.0) {
            return Err(LatticeError::InvalidSettings(
                "calibration must be positive".into(),
            ));
        }
        if !self.park_height.is_finite() {
            return Err(LatticeError::InvalidSettings(
                "park_height must be finite".into(),
            ));
        }
        if self.layers.tiers.is_empty() {
            return Err(LatticeError::InvalidSettings(
                "layer schedule needs at least one tier".into(),
            ));
        }
        if self.layers.tiers.iter().any(|t| t.edges == 0 || !t.height.is_finite()) {
            return Err(LatticeError::InvalidSettings(
                "every layer tier needs a positive edge count and a finite height".into(),
            ));
        }
        if self
            .layers
            .tiers
            .windows(2)
            .any(|w| w[1].height < w[0].height)
        {
            return Err(LatticeError::InvalidSettings(
                "layer heights must not decrease".into(),
            ));
        }
        Ok(())
    }
}
