//! PMV comfort parameters: PPD limit and humidity ratio band.

use crate::Criteria;
use crate::condition::{DiscomfortReason, ThermalCondition};
use crate::error::{CriteriaError, CriteriaResult};
use serde::{Deserialize, Serialize};
use tc_models::pmv::{DEFAULT_STILL_AIR_THRESHOLD, ppd_from_pmv, ppd_threshold_from_comfort_class};

pub const DEFAULT_PPD_COMFORT_THRESH: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PmvParameterSpec")]
pub struct PmvParameter {
    ppd_comfort_thresh: f64,
    humid_ratio_upper: f64,
    humid_ratio_lower: f64,
    still_air_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PmvParameterSpec {
    ppd_comfort_thresh: f64,
    humid_ratio_upper: f64,
    humid_ratio_lower: f64,
    still_air_threshold: f64,
}

impl Default for PmvParameterSpec {
    fn default() -> Self {
        Self {
            ppd_comfort_thresh: DEFAULT_PPD_COMFORT_THRESH,
            humid_ratio_upper: 1.0,
            humid_ratio_lower: 0.0,
            still_air_threshold: DEFAULT_STILL_AIR_THRESHOLD,
        }
    }
}

impl TryFrom<PmvParameterSpec> for PmvParameter {
    type Error = CriteriaError;

    fn try_from(s: PmvParameterSpec) -> CriteriaResult<Self> {
        PmvParameter::new(
            s.ppd_comfort_thresh,
            s.humid_ratio_upper,
            s.humid_ratio_lower,
            s.still_air_threshold,
        )
    }
}

impl Default for PmvParameter {
    fn default() -> Self {
        Self {
            ppd_comfort_thresh: DEFAULT_PPD_COMFORT_THRESH,
            humid_ratio_upper: 1.0,
            humid_ratio_lower: 0.0,
            still_air_threshold: DEFAULT_STILL_AIR_THRESHOLD,
        }
    }
}

fn check_ppd_thresh(ppd: f64) -> CriteriaResult<f64> {
    if !(5.0..=100.0).contains(&ppd) {
        return Err(CriteriaError::InvalidArg {
            what: format!("ppd_comfort_thresh must be between 5 and 100, got {ppd}"),
        });
    }
    Ok(ppd)
}

impl PmvParameter {
    pub fn new(
        ppd_comfort_thresh: f64,
        humid_ratio_upper: f64,
        humid_ratio_lower: f64,
        still_air_threshold: f64,
    ) -> CriteriaResult<Self> {
        let ppd_comfort_thresh = check_ppd_thresh(ppd_comfort_thresh)?;
        for (name, hr) in [
            ("humid_ratio_upper", humid_ratio_upper),
            ("humid_ratio_lower", humid_ratio_lower),
        ] {
            if !(0.0..=1.0).contains(&hr) {
                return Err(CriteriaError::InvalidArg {
                    what: format!("{name} must be between 0 and 1, got {hr}"),
                });
            }
        }
        if humid_ratio_lower > humid_ratio_upper {
            return Err(CriteriaError::InvalidArg {
                what: format!(
                    "humid_ratio_lower ({humid_ratio_lower}) exceeds humid_ratio_upper ({humid_ratio_upper})"
                ),
            });
        }
        if !(still_air_threshold >= 0.0) {
            return Err(CriteriaError::InvalidArg {
                what: format!("still_air_threshold must be at least 0, got {still_air_threshold}"),
            });
        }
        Ok(Self {
            ppd_comfort_thresh,
            humid_ratio_upper,
            humid_ratio_lower,
            still_air_threshold,
        })
    }

    pub fn ppd_comfort_thresh(&self) -> f64 {
        self.ppd_comfort_thresh
    }

    pub fn humid_ratio_upper(&self) -> f64 {
        self.humid_ratio_upper
    }

    pub fn humid_ratio_lower(&self) -> f64 {
        self.humid_ratio_lower
    }

    pub fn still_air_threshold(&self) -> f64 {
        self.still_air_threshold
    }

    pub fn set_ppd_comfort_thresh(&mut self, ppd: f64) -> CriteriaResult<()> {
        self.ppd_comfort_thresh = check_ppd_thresh(ppd)?;
        Ok(())
    }

    /// ISO 7730 comfort class 1, 2 or 3.
    pub fn set_ppd_comfort_thresh_from_comfort_class(&mut self, class: u8) -> CriteriaResult<()> {
        let ppd = ppd_threshold_from_comfort_class(class)?;
        self.set_ppd_comfort_thresh(ppd)
    }

    /// True when the humidity band narrows the default 0..1 range.
    pub fn requires_humidity_ratio(&self) -> bool {
        self.humid_ratio_upper < 1.0 || self.humid_ratio_lower > 0.0
    }

    pub fn is_comfortable(&self, ppd: f64, humidity_ratio: f64) -> bool {
        ppd <= self.ppd_comfort_thresh
            && humidity_ratio >= self.humid_ratio_lower
            && humidity_ratio <= self.humid_ratio_upper
    }

    /// Cold or hot once PPD exceeds the limit; a PPD exactly at the limit is
    /// neutral, matching [`Self::is_comfortable`].
    pub fn thermal_condition(&self, pmv: f64, ppd: f64) -> ThermalCondition {
        if ppd > self.ppd_comfort_thresh {
            if pmv > 0.0 {
                ThermalCondition::Hot
            } else {
                ThermalCondition::Cold
            }
        } else {
            ThermalCondition::Neutral
        }
    }

    pub fn discomfort_reason(&self, pmv: f64, ppd: f64, humidity_ratio: f64) -> DiscomfortReason {
        match self.thermal_condition(pmv, ppd) {
            ThermalCondition::Hot => DiscomfortReason::TooHot,
            ThermalCondition::Cold => DiscomfortReason::TooCold,
            _ if humidity_ratio < self.humid_ratio_lower => DiscomfortReason::TooDry,
            _ if humidity_ratio > self.humid_ratio_upper => DiscomfortReason::TooHumid,
            _ => DiscomfortReason::Comfortable,
        }
    }
}

impl Criteria for PmvParameter {
    type Category = ThermalCondition;

    fn model(&self) -> &'static str {
        "PMV"
    }

    fn categorize(&self, pmv: f64) -> ThermalCondition {
        self.thermal_condition(pmv, ppd_from_pmv(pmv))
    }

    fn condition(&self, pmv: f64) -> ThermalCondition {
        self.categorize(pmv)
    }
}
