//! Shared input record for the heat-balance models (PMV and SET).

use serde::{Deserialize, Serialize};

/// Environmental and personal variables of one evaluation point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalInputs {
    /// Air temperature (C).
    pub ta: f64,
    /// Mean radiant temperature (C).
    pub tr: f64,
    /// Relative air speed (m/s).
    pub vel: f64,
    /// Relative humidity (%).
    pub rh: f64,
    /// Metabolic rate (met).
    pub met: f64,
    /// Clothing insulation (clo).
    pub clo: f64,
    /// External work (met), usually 0.
    pub wme: f64,
}

impl ThermalInputs {
    pub fn new(ta: f64, tr: f64, vel: f64, rh: f64, met: f64, clo: f64) -> Self {
        Self {
            ta,
            tr,
            vel,
            rh,
            met,
            clo,
            wme: 0.0,
        }
    }

    pub fn with_external_work(mut self, wme: f64) -> Self {
        self.wme = wme;
        self
    }

    /// Same person in air and radiant temperatures lowered by `delta` at `vel`.
    pub fn cooled(&self, delta: f64, vel: f64) -> Self {
        Self {
            ta: self.ta - delta,
            tr: self.tr - delta,
            vel,
            ..*self
        }
    }
}
