//! Rheology models mapping wall shear rate to volumetric flow.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, DomainError, Result};

/// Seconds per minute; shear rates are per second, flow is per minute.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Volumetric flow rate (mm³/min) through a round nozzle for a power-law fluid.
///
/// `Q = γ · π · (D/2)³ · n / (3n + 1) · 60`
///
/// # Errors
///
/// Returns [`DomainError`] when `3n + 1 == 0`, when the diameter is not
/// positive, or when any input is not finite.
pub fn flow_rate(shear_rate: f64, nozzle_diameter: f64, power_law_index: f64) -> Result<f64> {
    let shear_rate = ensure_finite("shear rate", shear_rate)?;
    let nozzle_diameter = ensure_finite("nozzle diameter", nozzle_diameter)?;
    let n = ensure_finite("power-law index", power_law_index)?;

    if nozzle_diameter <= 0.0 {
        return Err(DomainError::NonPositiveDiameter(nozzle_diameter));
    }
    let denominator = 3.0 * n + 1.0;
    if denominator == 0.0 {
        return Err(DomainError::SingularPowerLawIndex(n));
    }

    let radius = nozzle_diameter / 2.0;
    Ok((shear_rate * PI * radius.powi(3) * n) / denominator * SECONDS_PER_MINUTE)
}

/// Linear speed (mm/min) a piston would need to push `flow_rate` through the
/// nozzle cross-section: `v = Q / (π R²)`.
///
/// # Errors
///
/// Returns [`DomainError`] when the radius is not positive or an input is
/// not finite.
pub fn extrusion_speed_ratio(flow_rate: f64, nozzle_radius: f64) -> Result<f64> {
    let flow_rate = ensure_finite("flow rate", flow_rate)?;
    let nozzle_radius = ensure_finite("nozzle radius", nozzle_radius)?;
    if nozzle_radius <= 0.0 {
        return Err(DomainError::NonPositiveRadius(nozzle_radius));
    }
    Ok(flow_rate / (PI * nozzle_radius.powi(2)))
}

/// A fluid model that yields a volumetric flow rate for a nozzle.
pub trait FlowModel {
    /// Volumetric flow rate (mm³/min) at the given wall shear rate (1/s).
    fn flow_rate(&self, shear_rate: f64, nozzle_diameter: f64) -> Result<f64>;

    /// Short name used in logs and summaries.
    fn name(&self) -> &'static str;
}

/// Ostwald–de Waele power-law fluid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLaw {
    /// Flow behaviour index `n` (1 is Newtonian, below 1 shear-thinning).
    pub index: f64,
}

impl PowerLaw {
    /// Create a power-law model with the given index.
    pub fn new(index: f64) -> Self {
        Self { index }
    }
}

impl FlowModel for PowerLaw {
    fn flow_rate(&self, shear_rate: f64, nozzle_diameter: f64) -> Result<f64> {
        flow_rate(shear_rate, nozzle_diameter, self.index)
    }

    fn name(&self) -> &'static str {
        "power-law"
    }
}

/// Newtonian fluid (the power-law model with `n = 1`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Newtonian;

impl FlowModel for Newtonian {
    fn flow_rate(&self, shear_rate: f64, nozzle_diameter: f64) -> Result<f64> {
        flow_rate(shear_rate, nozzle_diameter, 1.0)
    }

    fn name(&self) -> &'static str {
        "newtonian"
    }
}

/// Model selection for configuration files and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// Use the configured power-law index.
    #[default]
    PowerLaw,
    /// Ignore the index and treat the fluid as Newtonian.
    Newtonian,
}

impl ModelKind {
    /// Build the model, taking the index from the process parameters.
    pub fn build(self, power_law_index: f64) -> Box<dyn FlowModel> {
        match self {
            ModelKind::PowerLaw => Box::new(PowerLaw::new(power_law_index)),
            ModelKind::Newtonian => Box::new(Newtonian),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_flow_rate() {
        // 50 * pi * 0.2^3 * 1 / 4 * 60
        let q = flow_rate(50.0, 0.4, 1.0).unwrap();
        assert_relative_eq!(q, 6.0 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_reference_speed_ratio() {
        let q = flow_rate(50.0, 0.4, 1.0).unwrap();
        let v = extrusion_speed_ratio(q, 0.2).unwrap();
        assert_relative_eq!(v, 150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_shear_thinning_reduces_flow() {
        let newtonian = flow_rate(100.0, 0.6, 1.0).unwrap();
        let thinning = flow_rate(100.0, 0.6, 0.4).unwrap();
        assert!(thinning < newtonian);
    }

    #[test]
    fn test_singular_index() {
        let err = flow_rate(50.0, 0.4, -1.0 / 3.0).unwrap_err();
        assert!(matches!(err, DomainError::SingularPowerLawIndex(_)));
    }

    #[test]
    fn test_non_positive_diameter() {
        assert_eq!(
            flow_rate(50.0, 0.0, 1.0),
            Err(DomainError::NonPositiveDiameter(0.0))
        );
        assert!(flow_rate(50.0, -0.4, 1.0).is_err());
    }

    #[test]
    fn test_non_positive_radius() {
        assert_eq!(
            extrusion_speed_ratio(10.0, 0.0),
            Err(DomainError::NonPositiveRadius(0.0))
        );
    }

    #[test]
    fn test_non_finite_input() {
        let err = flow_rate(f64::NAN, 0.4, 1.0).unwrap_err();
        assert!(matches!(err, DomainError::NonFinite { name: "shear rate", .. }));
        assert!(extrusion_speed_ratio(f64::INFINITY, 0.2).is_err());
    }

    #[test]
    fn test_pure() {
        let a = flow_rate(37.5, 0.84, 0.63).unwrap();
        let b = flow_rate(37.5, 0.84, 0.63).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_newtonian_matches_unit_index() {
        let model = ModelKind::Newtonian.build(0.3);
        assert_eq!(model.name(), "newtonian");
        assert_eq!(
            model.flow_rate(50.0, 0.4).unwrap(),
            flow_rate(50.0, 0.4, 1.0).unwrap()
        );
    }
}
