//! UTCI comfort thresholds and stress scales.

use crate::condition::{ThermalCondition, UtciCategory};
use crate::error::{CriteriaError, CriteriaResult};
use crate::Criteria;
use serde::{Deserialize, Serialize};

/// Named UTCI stress scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressScale {
    FivePoint,
    SevenPoint,
    NinePoint,
    ElevenPoint,
    /// The ten published categories, 0..=9.
    Original,
}

/// Thresholds (C) separating the UTCI stress categories.
///
/// Values below a cold threshold or above a heat threshold fall outside it;
/// a value exactly on a threshold stays on the side nearer neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UtciThresholds")]
pub struct UtciParameter {
    cold_thresh: f64,
    heat_thresh: f64,
    extreme_cold_thresh: f64,
    very_strong_cold_thresh: f64,
    strong_cold_thresh: f64,
    moderate_cold_thresh: f64,
    moderate_heat_thresh: f64,
    strong_heat_thresh: f64,
    very_strong_heat_thresh: f64,
    extreme_heat_thresh: f64,
}

/// Unvalidated threshold set, as read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtciThresholds {
    pub cold_thresh: f64,
    pub heat_thresh: f64,
    pub extreme_cold_thresh: f64,
    pub very_strong_cold_thresh: f64,
    pub strong_cold_thresh: f64,
    pub moderate_cold_thresh: f64,
    pub moderate_heat_thresh: f64,
    pub strong_heat_thresh: f64,
    pub very_strong_heat_thresh: f64,
    pub extreme_heat_thresh: f64,
}

impl Default for UtciThresholds {
    fn default() -> Self {
        Self {
            cold_thresh: 9.0,
            heat_thresh: 26.0,
            extreme_cold_thresh: -40.0,
            very_strong_cold_thresh: -27.0,
            strong_cold_thresh: -13.0,
            moderate_cold_thresh: 0.0,
            moderate_heat_thresh: 28.0,
            strong_heat_thresh: 32.0,
            very_strong_heat_thresh: 38.0,
            extreme_heat_thresh: 46.0,
        }
    }
}

impl TryFrom<UtciThresholds> for UtciParameter {
    type Error = CriteriaError;

    fn try_from(t: UtciThresholds) -> CriteriaResult<Self> {
        let ordered = [
            ("extreme_cold_thresh", t.extreme_cold_thresh),
            ("very_strong_cold_thresh", t.very_strong_cold_thresh),
            ("strong_cold_thresh", t.strong_cold_thresh),
            ("moderate_cold_thresh", t.moderate_cold_thresh),
            ("cold_thresh", t.cold_thresh),
            ("heat_thresh", t.heat_thresh),
            ("moderate_heat_thresh", t.moderate_heat_thresh),
            ("strong_heat_thresh", t.strong_heat_thresh),
            ("very_strong_heat_thresh", t.very_strong_heat_thresh),
            ("extreme_heat_thresh", t.extreme_heat_thresh),
        ];
        if let Some((name, value)) = ordered.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CriteriaError::InvalidArg {
                what: format!("{name} must be finite, got {value}"),
            });
        }
        for pair in ordered.windows(2) {
            let ((lo_name, lo), (hi_name, hi)) = (pair[0], pair[1]);
            if lo > hi {
                return Err(CriteriaError::InvalidArg {
                    what: format!("{lo_name} ({lo}) must not exceed {hi_name} ({hi})"),
                });
            }
        }
        Ok(Self {
            cold_thresh: t.cold_thresh,
            heat_thresh: t.heat_thresh,
            extreme_cold_thresh: t.extreme_cold_thresh,
            very_strong_cold_thresh: t.very_strong_cold_thresh,
            strong_cold_thresh: t.strong_cold_thresh,
            moderate_cold_thresh: t.moderate_cold_thresh,
            moderate_heat_thresh: t.moderate_heat_thresh,
            strong_heat_thresh: t.strong_heat_thresh,
            very_strong_heat_thresh: t.very_strong_heat_thresh,
            extreme_heat_thresh: t.extreme_heat_thresh,
        })
    }
}

impl From<UtciParameter> for UtciThresholds {
    fn from(p: UtciParameter) -> Self {
        Self {
            cold_thresh: p.cold_thresh,
            heat_thresh: p.heat_thresh,
            extreme_cold_thresh: p.extreme_cold_thresh,
            very_strong_cold_thresh: p.very_strong_cold_thresh,
            strong_cold_thresh: p.strong_cold_thresh,
            moderate_cold_thresh: p.moderate_cold_thresh,
            moderate_heat_thresh: p.moderate_heat_thresh,
            strong_heat_thresh: p.strong_heat_thresh,
            very_strong_heat_thresh: p.very_strong_heat_thresh,
            extreme_heat_thresh: p.extreme_heat_thresh,
        }
    }
}

impl Default for UtciParameter {
    fn default() -> Self {
        Self::from_default_thresholds()
    }
}

impl UtciParameter {
    pub fn new(thresholds: UtciThresholds) -> CriteriaResult<Self> {
        thresholds.try_into()
    }

    /// Comfort band only, with the default stress thresholds around it.
    pub fn with_comfort_band(cold_thresh: f64, heat_thresh: f64) -> CriteriaResult<Self> {
        Self::new(UtciThresholds {
            cold_thresh,
            heat_thresh,
            ..UtciThresholds::default()
        })
    }

    fn from_default_thresholds() -> Self {
        let t = UtciThresholds::default();
        Self {
            cold_thresh: t.cold_thresh,
            heat_thresh: t.heat_thresh,
            extreme_cold_thresh: t.extreme_cold_thresh,
            very_strong_cold_thresh: t.very_strong_cold_thresh,
            strong_cold_thresh: t.strong_cold_thresh,
            moderate_cold_thresh: t.moderate_cold_thresh,
            moderate_heat_thresh: t.moderate_heat_thresh,
            strong_heat_thresh: t.strong_heat_thresh,
            very_strong_heat_thresh: t.very_strong_heat_thresh,
            extreme_heat_thresh: t.extreme_heat_thresh,
        }
    }

    pub fn thresholds(&self) -> UtciThresholds {
        (*self).into()
    }

    pub fn cold_thresh(&self) -> f64 {
        self.cold_thresh
    }

    pub fn heat_thresh(&self) -> f64 {
        self.heat_thresh
    }

    pub fn is_comfortable(&self, utci: f64) -> bool {
        utci >= self.cold_thresh && utci <= self.heat_thresh
    }

    pub fn thermal_condition(&self, utci: f64) -> ThermalCondition {
        if utci < self.cold_thresh {
            ThermalCondition::Cold
        } else if utci > self.heat_thresh {
            ThermalCondition::Hot
        } else {
            ThermalCondition::Neutral
        }
    }

    /// -2..=2: strong cold, cold, neutral, hot, strong heat.
    pub fn thermal_condition_five_point(&self, utci: f64) -> i8 {
        self.scale(
            utci,
            &[self.strong_cold_thresh, self.cold_thresh],
            &[self.strong_heat_thresh, self.heat_thresh],
        )
    }

    /// -3..=3.
    pub fn thermal_condition_seven_point(&self, utci: f64) -> i8 {
        self.scale(
            utci,
            &[
                self.very_strong_cold_thresh,
                self.strong_cold_thresh,
                self.cold_thresh,
            ],
            &[
                self.very_strong_heat_thresh,
                self.strong_heat_thresh,
                self.heat_thresh,
            ],
        )
    }

    /// -4..=4. The extreme thresholds are not used.
    pub fn thermal_condition_nine_point(&self, utci: f64) -> i8 {
        self.scale(
            utci,
            &[
                self.very_strong_cold_thresh,
                self.strong_cold_thresh,
                self.moderate_cold_thresh,
                self.cold_thresh,
            ],
            &[
                self.very_strong_heat_thresh,
                self.strong_heat_thresh,
                self.moderate_heat_thresh,
                self.heat_thresh,
            ],
        )
    }

    /// -5..=5, the full UTCI stress scale.
    pub fn thermal_condition_eleven_point(&self, utci: f64) -> i8 {
        self.scale(
            utci,
            &[
                self.extreme_cold_thresh,
                self.very_strong_cold_thresh,
                self.strong_cold_thresh,
                self.moderate_cold_thresh,
                self.cold_thresh,
            ],
            &[
                self.extreme_heat_thresh,
                self.very_strong_heat_thresh,
                self.strong_heat_thresh,
                self.moderate_heat_thresh,
                self.heat_thresh,
            ],
        )
    }

    /// Ten published UTCI categories, 0 (extreme cold) to 9 (extreme heat).
    ///
    /// Moderate and slight heat share category 6.
    pub fn original_utci_category(&self, utci: f64) -> u8 {
        let hot = self.scale(
            utci,
            &[],
            &[
                self.extreme_heat_thresh,
                self.very_strong_heat_thresh,
                self.strong_heat_thresh,
                self.heat_thresh,
            ],
        );
        if hot > 0 {
            return 5 + hot as u8;
        }
        let cold = self.scale(
            utci,
            &[
                self.extreme_cold_thresh,
                self.very_strong_cold_thresh,
                self.strong_cold_thresh,
                self.moderate_cold_thresh,
                self.cold_thresh,
            ],
            &[],
        );
        (5 + cold) as u8
    }

    pub fn stress_level(&self, scale: StressScale, utci: f64) -> i8 {
        match scale {
            StressScale::FivePoint => self.thermal_condition_five_point(utci),
            StressScale::SevenPoint => self.thermal_condition_seven_point(utci),
            StressScale::NinePoint => self.thermal_condition_nine_point(utci),
            StressScale::ElevenPoint => self.thermal_condition_eleven_point(utci),
            StressScale::Original => self.original_utci_category(utci) as i8,
        }
    }

    /// Eleven-point category label.
    pub fn category(&self, utci: f64) -> UtciCategory {
        let value = self.thermal_condition_eleven_point(utci);
        UtciCategory::from_value(value).unwrap_or(if value < 0 {
            UtciCategory::ExtremeColdStress
        } else {
            UtciCategory::ExtremeHeatStress
        })
    }

    /// Cold thresholds from most to least severe, then heat thresholds the
    /// same way. The first strict crossing wins; cold side is checked first.
    fn scale(&self, utci: f64, cold: &[f64], heat: &[f64]) -> i8 {
        for (i, thresh) in cold.iter().enumerate() {
            if utci < *thresh {
                return -((cold.len() - i) as i8);
            }
        }
        for (i, thresh) in heat.iter().enumerate() {
            if utci > *thresh {
                return (heat.len() - i) as i8;
            }
        }
        0
    }
}

impl Criteria for UtciParameter {
    type Category = UtciCategory;

    fn model(&self) -> &'static str {
        "UTCI"
    }

    fn categorize(&self, value: f64) -> UtciCategory {
        self.category(value)
    }

    fn condition(&self, value: f64) -> ThermalCondition {
        self.thermal_condition(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = UtciParameter::default();
        assert_eq!(p.cold_thresh(), 9.0);
        assert_eq!(p.heat_thresh(), 26.0);
        assert_eq!(p.thresholds(), UtciThresholds::default());
    }

    #[test]
    fn comfort_band_is_closed() {
        let p = UtciParameter::default();
        assert!(p.is_comfortable(9.0));
        assert!(p.is_comfortable(26.0));
        assert!(!p.is_comfortable(8.999));
        assert!(!p.is_comfortable(26.001));
        assert_eq!(p.thermal_condition(9.0), ThermalCondition::Neutral);
        assert_eq!(p.thermal_condition(26.0), ThermalCondition::Neutral);
        assert_eq!(p.thermal_condition(8.9), ThermalCondition::Cold);
        assert_eq!(p.thermal_condition(26.1), ThermalCondition::Hot);
    }

    #[test]
    fn five_and_seven_point() {
        let p = UtciParameter::default();
        assert_eq!(p.thermal_condition_five_point(-20.0), -2);
        assert_eq!(p.thermal_condition_five_point(5.0), -1);
        assert_eq!(p.thermal_condition_five_point(20.0), 0);
        assert_eq!(p.thermal_condition_five_point(30.0), 1);
        assert_eq!(p.thermal_condition_five_point(35.0), 2);
        assert_eq!(p.thermal_condition_seven_point(-30.0), -3);
        assert_eq!(p.thermal_condition_seven_point(40.0), 3);
        assert_eq!(p.thermal_condition_seven_point(-13.0), -1);
    }

    #[test]
    fn nine_point_skips_extremes() {
        let p = UtciParameter::default();
        assert_eq!(p.thermal_condition_nine_point(-50.0), -4);
        assert_eq!(p.thermal_condition_nine_point(-5.0), -2);
        assert_eq!(p.thermal_condition_nine_point(27.0), 1);
        assert_eq!(p.thermal_condition_nine_point(29.0), 2);
        assert_eq!(p.thermal_condition_nine_point(50.0), 4);
    }

    #[test]
    fn eleven_point_full_scale() {
        let p = UtciParameter::default();
        let cases = [
            (-45.0, -5),
            (-30.0, -4),
            (-20.0, -3),
            (-5.0, -2),
            (5.0, -1),
            (20.0, 0),
            (27.0, 1),
            (30.0, 2),
            (35.0, 3),
            (40.0, 4),
            (50.0, 5),
        ];
        for (utci, expected) in cases {
            assert_eq!(p.thermal_condition_eleven_point(utci), expected, "utci {utci}");
            assert_eq!(p.category(utci).value(), expected);
        }
    }

    #[test]
    fn boundaries_fall_toward_neutral() {
        let p = UtciParameter::default();
        assert_eq!(p.category(-40.0), UtciCategory::VeryStrongColdStress);
        assert_eq!(p.category(0.0), UtciCategory::SlightColdStress);
        assert_eq!(p.category(28.0), UtciCategory::SlightHeatStress);
        assert_eq!(p.category(46.0), UtciCategory::VeryStrongHeatStress);
    }

    #[test]
    fn original_categories() {
        let p = UtciParameter::default();
        assert_eq!(p.original_utci_category(-45.0), 0);
        assert_eq!(p.original_utci_category(-30.0), 1);
        assert_eq!(p.original_utci_category(-20.0), 2);
        assert_eq!(p.original_utci_category(-5.0), 3);
        assert_eq!(p.original_utci_category(5.0), 4);
        assert_eq!(p.original_utci_category(20.0), 5);
        assert_eq!(p.original_utci_category(27.0), 6);
        assert_eq!(p.original_utci_category(30.0), 6);
        assert_eq!(p.original_utci_category(35.0), 7);
        assert_eq!(p.original_utci_category(40.0), 8);
        assert_eq!(p.original_utci_category(50.0), 9);
    }

    #[test]
    fn stress_level_dispatch() {
        let p = UtciParameter::default();
        assert_eq!(p.stress_level(StressScale::FivePoint, 35.0), 2);
        assert_eq!(p.stress_level(StressScale::ElevenPoint, 35.0), 3);
        assert_eq!(p.stress_level(StressScale::Original, 35.0), 7);
    }

    #[test]
    fn rejects_unordered_thresholds() {
        assert!(UtciParameter::with_comfort_band(27.0, 26.0).is_err());
        assert!(UtciParameter::with_comfort_band(9.0, 30.0).is_err());
        assert!(UtciParameter::with_comfort_band(f64::NAN, 26.0).is_err());
        assert!(UtciParameter::with_comfort_band(5.0, 27.5).is_ok());
    }

    #[test]
    fn deserialize_validates() {
        let p: UtciParameter = serde_json::from_str(r#"{"cold_thresh": 8.0}"#).unwrap();
        assert_eq!(p.cold_thresh(), 8.0);
        assert_eq!(p.heat_thresh(), 26.0);
        let bad: Result<UtciParameter, _> = serde_json::from_str(r#"{"heat_thresh": 40.0}"#);
        assert!(bad.is_err());
    }
}
