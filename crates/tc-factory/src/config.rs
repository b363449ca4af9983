//! Factory configuration: physiological defaults, exposure geometry and
//! criteria parameters.

use crate::error::{FactoryError, FactoryResult};
use serde::{Deserialize, Serialize};
use tc_criteria::{AdaptiveParameter, PetParameter, PmvParameter, UtciParameter};
use tc_models::SetConfig;
use tc_models::solarcal::{SkyExposure, SolarCalParameter};

/// Metabolic rate (met) of a seated indoor occupant.
pub const DEFAULT_INDOOR_MET: f64 = 1.1;
/// Metabolic rate (met) of a person walking outdoors.
pub const DEFAULT_OUTDOOR_MET: f64 = 2.4;
/// Clothing insulation (clo).
pub const DEFAULT_CLO: f64 = 0.7;
/// External work (met).
pub const DEFAULT_EXTERNAL_WORK: f64 = 0.0;
/// Air speed (m/s) of a person sheltered from wind.
pub const DEFAULT_STILL_AIR_SPEED: f64 = 0.1;
/// Lowest wind speed (m/s) the UTCI polynomial is fitted for.
pub const DEFAULT_UTCI_CALM_WIND: f64 = 0.5;
/// Ratio of wind at person height to meteorological (10 m) wind.
pub const PMV_WIND_SCALE: f64 = 2.0 / 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Metabolic rate used for outdoor PMV and PET.
    pub met_rate: f64,
    pub clo_value: f64,
    pub external_work: f64,
    /// Air speed when wind is excluded from PMV and adaptive models.
    pub still_air_speed: f64,
    /// Wind speed when wind is excluded from UTCI.
    pub calm_wind_speed: f64,
    /// Multiplier from weather wind to person-height wind.
    pub wind_scale: f64,
    /// Direction the person faces (degrees from north). When set, SHARP is
    /// derived from the sun azimuth at each step.
    pub body_azimuth: Option<f64>,
    pub solarcal: SolarCalParameter,
    pub sky_exposure: SkyExposure,
    pub set: SetConfig,
    pub utci: UtciParameter,
    pub pmv: PmvParameter,
    pub adaptive: AdaptiveParameter,
    pub pet: PetParameter,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            met_rate: DEFAULT_OUTDOOR_MET,
            clo_value: DEFAULT_CLO,
            external_work: DEFAULT_EXTERNAL_WORK,
            still_air_speed: DEFAULT_STILL_AIR_SPEED,
            calm_wind_speed: DEFAULT_UTCI_CALM_WIND,
            wind_scale: PMV_WIND_SCALE,
            body_azimuth: None,
            solarcal: SolarCalParameter::default(),
            sky_exposure: SkyExposure::default(),
            set: SetConfig::default(),
            utci: UtciParameter::default(),
            pmv: PmvParameter::default(),
            adaptive: AdaptiveParameter::default(),
            pet: PetParameter::default(),
        }
    }
}

impl FactoryConfig {
    /// Checks the fields serde cannot check on its own.
    pub fn validate(&self) -> FactoryResult<()> {
        let positive = [
            ("met_rate", self.met_rate),
            ("wind_scale", self.wind_scale),
        ];
        let non_negative = [
            ("clo_value", self.clo_value),
            ("external_work", self.external_work),
            ("still_air_speed", self.still_air_speed),
            ("calm_wind_speed", self.calm_wind_speed),
        ];
        for (what, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(what, value, "must be positive"));
            }
        }
        for (what, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(what, value, "must not be negative"));
            }
        }
        if let Some(az) = self.body_azimuth.filter(|az| !(0.0..=360.0).contains(az)) {
            return Err(invalid("body_azimuth", az, "must be between 0 and 360"));
        }
        // Re-run the validating constructors on plain-struct parameters.
        let s = &self.solarcal;
        SolarCalParameter::new(s.posture, s.sharp, s.body_absorptivity, s.body_emissivity)?;
        for (what, value) in [
            ("sky_exposure", self.sky_exposure.sky_exposure),
            ("fract_exposed", self.sky_exposure.fract_exposed),
            ("floor_reflectance", self.sky_exposure.floor_reflectance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(what, value, "must be between 0 and 1"));
            }
        }
        Ok(())
    }
}

fn invalid(what: &str, value: f64, rule: &str) -> FactoryError {
    FactoryError::InvalidConfig {
        what: format!("{what} {rule} (got {value})"),
    }
}
