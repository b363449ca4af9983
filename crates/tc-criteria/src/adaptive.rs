//! Adaptive comfort parameters.
//!
//! Defaults depend on the standard: ASHRAE-55 uses a 2.5 C offset, monthly
//! prevailing temperature, discrete air speed steps and a 10 C cold limit;
//! EN-15251 uses 3 C, a running mean, the continuous air speed function
//! and 15 C.

use crate::Criteria;
use crate::condition::ThermalCondition;
use crate::error::{CriteriaError, CriteriaResult};
use serde::{Deserialize, Serialize};
use tc_models::adaptive::{
    AdaptiveResult, AdaptiveStandard, adaptive_comfort_ashrae55, adaptive_comfort_conditioned,
    adaptive_comfort_en15251, ashrae55_neutral_offset_from_ppd, cooling_effect_ashrae55,
    cooling_effect_en15251, en15251_neutral_offset_from_comfort_class,
    neutral_temperature_conditioned,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrevailingMethod {
    MonthlyAverage,
    RunningMean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirSpeedMethod {
    Discrete,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AdaptiveParameterSpec")]
pub struct AdaptiveParameter {
    standard: AdaptiveStandard,
    neutral_offset: f64,
    prevailing_method: PrevailingMethod,
    air_speed_method: AirSpeedMethod,
    cold_prevail_temp_limit: f64,
    conditioning: f64,
}

/// Configuration form; unset fields take the standard's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveParameterSpec {
    pub standard: Option<AdaptiveStandard>,
    pub neutral_offset: Option<f64>,
    pub prevailing_method: Option<PrevailingMethod>,
    pub air_speed_method: Option<AirSpeedMethod>,
    pub cold_prevail_temp_limit: Option<f64>,
    pub conditioning: Option<f64>,
}

impl TryFrom<AdaptiveParameterSpec> for AdaptiveParameter {
    type Error = CriteriaError;

    fn try_from(s: AdaptiveParameterSpec) -> CriteriaResult<Self> {
        let base = AdaptiveParameter::for_standard(s.standard.unwrap_or(AdaptiveStandard::Ashrae55));
        let p = AdaptiveParameter {
            neutral_offset: s.neutral_offset.unwrap_or(base.neutral_offset),
            prevailing_method: s.prevailing_method.unwrap_or(base.prevailing_method),
            air_speed_method: s.air_speed_method.unwrap_or(base.air_speed_method),
            cold_prevail_temp_limit: s
                .cold_prevail_temp_limit
                .unwrap_or(base.cold_prevail_temp_limit),
            conditioning: s.conditioning.unwrap_or(base.conditioning),
            ..base
        };
        p.validate()?;
        Ok(p)
    }
}

impl Default for AdaptiveParameter {
    fn default() -> Self {
        Self::for_standard(AdaptiveStandard::Ashrae55)
    }
}

impl AdaptiveParameter {
    pub fn for_standard(standard: AdaptiveStandard) -> Self {
        match standard {
            AdaptiveStandard::Ashrae55 => Self {
                standard,
                neutral_offset: 2.5,
                prevailing_method: PrevailingMethod::MonthlyAverage,
                air_speed_method: AirSpeedMethod::Discrete,
                cold_prevail_temp_limit: 10.0,
                conditioning: 0.0,
            },
            AdaptiveStandard::En15251 => Self {
                standard,
                neutral_offset: 3.0,
                prevailing_method: PrevailingMethod::RunningMean,
                air_speed_method: AirSpeedMethod::Continuous,
                cold_prevail_temp_limit: 15.0,
                conditioning: 0.0,
            },
        }
    }

    pub fn with_neutral_offset(mut self, offset: f64) -> CriteriaResult<Self> {
        self.neutral_offset = offset;
        self.validate()?;
        Ok(self)
    }

    pub fn with_prevailing_method(mut self, method: PrevailingMethod) -> Self {
        self.prevailing_method = method;
        self
    }

    pub fn with_air_speed_method(mut self, method: AirSpeedMethod) -> Self {
        self.air_speed_method = method;
        self
    }

    pub fn with_cold_prevail_temp_limit(mut self, limit: f64) -> CriteriaResult<Self> {
        self.cold_prevail_temp_limit = limit;
        self.validate()?;
        Ok(self)
    }

    pub fn with_conditioning(mut self, conditioning: f64) -> CriteriaResult<Self> {
        self.conditioning = conditioning;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> CriteriaResult<()> {
        if !(10.0..=22.0).contains(&self.cold_prevail_temp_limit) {
            return Err(CriteriaError::InvalidArg {
                what: format!(
                    "cold_prevail_temp_limit must be between 10 and 22, got {}",
                    self.cold_prevail_temp_limit
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.conditioning) {
            return Err(CriteriaError::InvalidArg {
                what: format!("conditioning must be between 0 and 1, got {}", self.conditioning),
            });
        }
        if !(self.neutral_offset > 0.0 && self.neutral_offset <= 10.0) {
            return Err(CriteriaError::InvalidArg {
                what: format!(
                    "neutral_offset must be in (0, 10], got {}",
                    self.neutral_offset
                ),
            });
        }
        Ok(())
    }

    pub fn standard(&self) -> AdaptiveStandard {
        self.standard
    }

    pub fn neutral_offset(&self) -> f64 {
        self.neutral_offset
    }

    pub fn prevailing_method(&self) -> PrevailingMethod {
        self.prevailing_method
    }

    pub fn air_speed_method(&self) -> AirSpeedMethod {
        self.air_speed_method
    }

    pub fn cold_prevail_temp_limit(&self) -> f64 {
        self.cold_prevail_temp_limit
    }

    pub fn conditioning(&self) -> f64 {
        self.conditioning
    }

    /// Operative temperature (C) below which conditions cannot be comfortable.
    pub fn min_operative(&self) -> f64 {
        neutral_temperature_conditioned(
            self.cold_prevail_temp_limit,
            self.conditioning,
            self.standard,
        ) - self.neutral_offset
    }

    pub fn set_neutral_offset_from_ppd(&mut self, ppd: f64) -> CriteriaResult<()> {
        *self = self.with_neutral_offset(ashrae55_neutral_offset_from_ppd(ppd)?)?;
        Ok(())
    }

    pub fn set_neutral_offset_from_comfort_class(&mut self, class: u8) -> CriteriaResult<()> {
        *self = self.with_neutral_offset(en15251_neutral_offset_from_comfort_class(class)?)?;
        Ok(())
    }

    /// Neutral temperature model selected by standard and conditioning.
    pub fn comfort(&self, t_prevail: f64, to: f64) -> AdaptiveResult {
        if self.conditioning != 0.0 {
            adaptive_comfort_conditioned(t_prevail, to, self.conditioning, self.standard)
        } else {
            match self.standard {
                AdaptiveStandard::Ashrae55 => adaptive_comfort_ashrae55(t_prevail, to),
                AdaptiveStandard::En15251 => adaptive_comfort_en15251(t_prevail, to),
            }
        }
    }

    /// Cooling effect (C) of the air speed by the selected method.
    pub fn cooling_effect(&self, vel: f64, to: f64) -> f64 {
        match self.air_speed_method {
            AirSpeedMethod::Discrete => cooling_effect_ashrae55(vel, to),
            AirSpeedMethod::Continuous => cooling_effect_en15251(vel, to),
        }
    }

    pub fn is_comfortable(&self, result: &AdaptiveResult, cooling_effect: f64) -> bool {
        result.to >= self.min_operative()
            && result.deg_comf >= -self.neutral_offset
            && result.deg_comf <= self.neutral_offset + cooling_effect
    }

    pub fn thermal_condition(&self, result: &AdaptiveResult, cooling_effect: f64) -> ThermalCondition {
        if self.is_comfortable(result, cooling_effect) {
            ThermalCondition::Neutral
        } else if result.deg_comf > 0.0 {
            ThermalCondition::Hot
        } else {
            ThermalCondition::Cold
        }
    }
}

impl Criteria for AdaptiveParameter {
    type Category = ThermalCondition;

    fn model(&self) -> &'static str {
        "Adaptive"
    }

    /// Classifies degrees from neutral against the offset band alone.
    fn categorize(&self, deg_from_neutral: f64) -> ThermalCondition {
        if deg_from_neutral < -self.neutral_offset {
            ThermalCondition::Cold
        } else if deg_from_neutral > self.neutral_offset {
            ThermalCondition::Hot
        } else {
            ThermalCondition::Neutral
        }
    }

    fn condition(&self, deg_from_neutral: f64) -> ThermalCondition {
        self.categorize(deg_from_neutral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_defaults() {
        let ashrae = AdaptiveParameter::default();
        assert_eq!(ashrae.neutral_offset(), 2.5);
        assert_eq!(ashrae.prevailing_method(), PrevailingMethod::MonthlyAverage);
        assert_eq!(ashrae.air_speed_method(), AirSpeedMethod::Discrete);
        assert!((ashrae.min_operative() - 18.4).abs() < 1e-9);

        let en = AdaptiveParameter::for_standard(AdaptiveStandard::En15251);
        assert_eq!(en.neutral_offset(), 3.0);
        assert_eq!(en.prevailing_method(), PrevailingMethod::RunningMean);
        assert_eq!(en.cold_prevail_temp_limit(), 15.0);
        assert!((en.min_operative() - 20.75).abs() < 1e-9);
    }

    #[test]
    fn validation() {
        let p = AdaptiveParameter::default();
        assert!(p.with_neutral_offset(0.0).is_err());
        assert!(p.with_neutral_offset(11.0).is_err());
        assert!(p.with_cold_prevail_temp_limit(9.0).is_err());
        assert!(p.with_cold_prevail_temp_limit(23.0).is_err());
        assert!(p.with_conditioning(1.5).is_err());
        assert!(p.with_conditioning(0.5).is_ok());
    }

    #[test]
    fn offsets_from_ppd_and_class() {
        let mut p = AdaptiveParameter::default();
        p.set_neutral_offset_from_ppd(80.0).unwrap();
        assert!((p.neutral_offset() - 3.5).abs() < 1e-9);
        p.set_neutral_offset_from_comfort_class(1).unwrap();
        assert_eq!(p.neutral_offset(), 2.0);
        assert!(p.set_neutral_offset_from_comfort_class(5).is_err());
        assert_eq!(p.neutral_offset(), 2.0);
    }

    #[test]
    fn comfort_with_cooling_effect() {
        let p = AdaptiveParameter::default();
        let r = p.comfort(22.0, 28.0);
        assert!(!p.is_comfortable(&r, 0.0));
        assert_eq!(p.thermal_condition(&r, 0.0), ThermalCondition::Hot);
        let ce = p.cooling_effect(1.0, 28.0);
        assert_eq!(ce, 1.8);
        assert!(p.is_comfortable(&r, ce));
        assert_eq!(p.thermal_condition(&r, ce), ThermalCondition::Neutral);
    }

    #[test]
    fn cold_below_min_operative() {
        let p = AdaptiveParameter::default();
        let r = AdaptiveResult {
            to: 18.0,
            t_comf: 18.5,
            deg_comf: -0.5,
        };
        assert!(!p.is_comfortable(&r, 0.0));
        assert_eq!(p.thermal_condition(&r, 0.0), ThermalCondition::Cold);
    }

    #[test]
    fn categorize_band_edges() {
        let p = AdaptiveParameter::default();
        assert_eq!(p.categorize(2.5), ThermalCondition::Neutral);
        assert_eq!(p.categorize(-2.5), ThermalCondition::Neutral);
        assert_eq!(p.categorize(2.6), ThermalCondition::Hot);
        assert_eq!(p.categorize(-2.6), ThermalCondition::Cold);
    }

    #[test]
    fn conditioned_function_selected() {
        let p = AdaptiveParameter::default().with_conditioning(1.0).unwrap();
        let r = p.comfort(24.0, 23.0);
        assert!((r.t_comf - 24.76).abs() < 1e-9);
    }

    #[test]
    fn deserialize_uses_standard_defaults() {
        let p: AdaptiveParameter = serde_yaml::from_str("standard: EN-15251\n").unwrap();
        assert_eq!(p.neutral_offset(), 3.0);
        assert_eq!(p.air_speed_method(), AirSpeedMethod::Continuous);
        let bad: Result<AdaptiveParameter, _> = serde_yaml::from_str("conditioning: 2.0\n");
        assert!(bad.is_err());
    }
}
