//! Run configuration: TOML file, command-line overrides and defaults.

use std::path::Path;

use anyhow::{Context, Result};
use rheopath_flow::ModelKind;
use rheopath_gcode::GcodeSettings;
use rheopath_lattice::{LatticeSettings, ProcessParameters};
use rheopath_plot::PlotSettings;
use serde::{Deserialize, Serialize};

/// Process inputs that may be left unset and filled in later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessInputs {
    pub deltax: Option<f64>,
    pub deltay: Option<f64>,
    pub feed_rates: Option<Vec<f64>>,
    pub nozzle_diameter: Option<f64>,
    pub shear_rate: Option<f64>,
    pub power_law_index: Option<f64>,
    pub model: Option<ModelKind>,
}

impl ProcessInputs {
    /// Every input set to the reference run.
    pub fn reference() -> Self {
        let p = ProcessParameters::default();
        Self {
            deltax: Some(p.deltax),
            deltay: Some(p.deltay),
            feed_rates: Some(p.feed_rates),
            nozzle_diameter: Some(p.nozzle_diameter),
            shear_rate: Some(p.shear_rate),
            power_law_index: Some(p.power_law_index),
            model: Some(p.model),
        }
    }

    /// Values set in `other` replace ours.
    pub fn overlay(self, other: ProcessInputs) -> Self {
        Self {
            deltax: other.deltax.or(self.deltax),
            deltay: other.deltay.or(self.deltay),
            feed_rates: other.feed_rates.or(self.feed_rates),
            nozzle_diameter: other.nozzle_diameter.or(self.nozzle_diameter),
            shear_rate: other.shear_rate.or(self.shear_rate),
            power_law_index: other.power_law_index.or(self.power_law_index),
            model: other.model.or(self.model),
        }
    }

    /// Fill unset inputs from the reference run.
    pub fn or_defaults(self) -> ProcessParameters {
        let d = ProcessParameters::default();
        ProcessParameters {
            deltax: self.deltax.unwrap_or(d.deltax),
            deltay: self.deltay.unwrap_or(d.deltay),
            feed_rates: self.feed_rates.unwrap_or(d.feed_rates),
            nozzle_diameter: self.nozzle_diameter.unwrap_or(d.nozzle_diameter),
            shear_rate: self.shear_rate.unwrap_or(d.shear_rate),
            power_law_index: self.power_law_index.unwrap_or(d.power_law_index),
            model: self.model.unwrap_or(d.model),
        }
    }

    /// True when nothing is left to ask for.
    pub fn is_complete(&self) -> bool {
        self.deltax.is_some()
            && self.deltay.is_some()
            && self.feed_rates.is_some()
            && self.nozzle_diameter.is_some()
            && self.shear_rate.is_some()
            && self.power_law_index.is_some()
    }
}

/// Contents of a `--config` file. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub process: ProcessInputs,
    pub lattice: LatticeSettings,
    pub gcode: GcodeSettings,
    pub plot: PlotSettings,
}

impl RunConfig {
    /// The reference run with every field spelled out.
    pub fn reference() -> Self {
        Self {
            process: ProcessInputs::reference(),
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
