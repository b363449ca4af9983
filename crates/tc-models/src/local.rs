//! Local thermal discomfort from radiant asymmetry (ASHRAE-55 Figure 5.2.4.1).

use serde::{Deserialize, Serialize};

/// Surface causing the asymmetry. People are more sensitive to warm
/// ceilings and cool walls than to cool ceilings and warm walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsymmetryType {
    WarmCeiling,
    CoolWall,
    CoolCeiling,
    WarmWall,
}

impl AsymmetryType {
    /// Logistic fit `(intercept, slope, cap, offset)` of the standard's curve.
    fn curve(self) -> (f64, f64, f64, f64) {
        match self {
            AsymmetryType::WarmCeiling => (2.84, 0.174, 23.0, 5.5),
            AsymmetryType::CoolWall => (6.61, 0.345, 15.0, 0.0),
            AsymmetryType::CoolCeiling => (9.93, 0.50, 15.0, 0.0),
            AsymmetryType::WarmWall => (3.72, 0.052, 35.0, 3.5),
        }
    }
}

/// Percentage of people dissatisfied by a radiant temperature difference
/// (C) between the two sides of the plane an occupant is in.
///
/// Differences beyond the published curve return its maximum PPD.
pub fn radiant_asymmetry_ppd(radiant_temperature_difference: f64, asymmetry: AsymmetryType) -> f64 {
    let (intercept, slope, cap, offset) = asymmetry.curve();
    let td = radiant_temperature_difference.min(cap);
    100.0 / (1.0 + (intercept - slope * td).exp()) - offset
}
