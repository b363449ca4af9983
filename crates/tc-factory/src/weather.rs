//! Weather data sources.
//!
//! A [`WeatherSource`] hands the factory named, aligned hourly (or
//! sub-hourly) series in the physical units listed on [`WeatherVariable`].
//! Reading weather files is up to the caller; [`WeatherData`] is the
//! in-memory source and can be loaded from YAML or JSON.

use crate::error::{FactoryError, FactoryResult};
use crate::solar::SolarPosition;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tc_core::units::constants::{STANDARD_PRESSURE_PA, STEFAN_BOLTZMANN};
use tc_core::{TimeSeries, Timestep, ZERO_CELSIUS_K, ensure_finite};

/// Named weather variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherVariable {
    /// Dry bulb temperature (C).
    DryBulbTemperature,
    /// Relative humidity (%).
    RelativeHumidity,
    /// Wind speed at meteorological height (m/s).
    WindSpeed,
    /// Direct normal irradiance (W/m2).
    DirectNormalRadiation,
    /// Diffuse horizontal irradiance (W/m2).
    DiffuseHorizontalRadiation,
    /// Downwelling horizontal infrared (W/m2).
    HorizontalInfraredRadiation,
    /// Station pressure (Pa).
    AtmosphericStationPressure,
}

impl WeatherVariable {
    pub fn name(&self) -> &'static str {
        match self {
            WeatherVariable::DryBulbTemperature => "dry_bulb_temperature",
            WeatherVariable::RelativeHumidity => "relative_humidity",
            WeatherVariable::WindSpeed => "wind_speed",
            WeatherVariable::DirectNormalRadiation => "direct_normal_radiation",
            WeatherVariable::DiffuseHorizontalRadiation => "diffuse_horizontal_radiation",
            WeatherVariable::HorizontalInfraredRadiation => "horizontal_infrared_radiation",
            WeatherVariable::AtmosphericStationPressure => "atmospheric_station_pressure",
        }
    }
}

/// Site of a weather record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub name: String,
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Hours from UTC of the local standard time, positive east.
    pub time_zone: f64,
    /// Meters above sea level.
    pub elevation: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            time_zone: 0.0,
            elevation: 0.0,
        }
    }
}

impl Location {
    pub fn validate(&self) -> FactoryResult<()> {
        let checks = [
            ("latitude", self.latitude, -90.0, 90.0),
            ("longitude", self.longitude, -180.0, 180.0),
            ("time_zone", self.time_zone, -12.0, 14.0),
        ];
        for (what, value, lo, hi) in checks {
            if !(lo..=hi).contains(&value) {
                return Err(FactoryError::InvalidWeather {
                    what: format!("{what} {value} outside [{lo}, {hi}]"),
                });
            }
        }
        Ok(())
    }

    /// Standard-atmosphere pressure (Pa) at the site elevation.
    pub fn standard_pressure(&self) -> f64 {
        STANDARD_PRESSURE_PA * (1.0 - 2.25577e-5 * self.elevation).powf(5.2559)
    }
}

/// Provider of aligned weather series.
pub trait WeatherSource {
    /// Timestep shared by every variable.
    fn timestep(&self) -> &Timestep;

    /// Values of `variable`, or `None` when the source lacks it.
    fn variable(&self, variable: WeatherVariable) -> Option<&[f64]>;

    fn location(&self) -> &Location;

    /// `variable` as a time series; missing variables are an error.
    fn series(&self, variable: WeatherVariable) -> FactoryResult<TimeSeries<f64>> {
        let values = self
            .variable(variable)
            .ok_or_else(|| FactoryError::MissingInput {
                what: variable.name().to_string(),
            })?;
        Ok(TimeSeries::new(*self.timestep(), values.to_vec())?)
    }

    /// Sun position at the middle of every interval.
    fn solar_positions(&self) -> Vec<SolarPosition> {
        let header = self.timestep();
        let half = chrono::TimeDelta::seconds(i64::from(header.interval_minutes) * 30);
        (0..header.count)
            .map(|i| SolarPosition::from_local_time(self.location(), header.datetime_at(i) + half))
            .collect()
    }
}

/// In-memory weather record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    #[serde(default)]
    pub location: Location,
    pub timestep: Timestep,
    pub variables: BTreeMap<WeatherVariable, Vec<f64>>,
}

/// Peak-to-mean swing (C) of the synthetic daily temperature cycle.
const SYNTHETIC_DAILY_SWING: f64 = 4.0;

impl WeatherData {
    pub fn new(location: Location, timestep: Timestep) -> Self {
        Self {
            location,
            timestep,
            variables: BTreeMap::new(),
        }
    }

    /// Adds or replaces a variable; its length must match the timestep.
    pub fn insert(&mut self, variable: WeatherVariable, values: Vec<f64>) -> FactoryResult<()> {
        if values.len() != self.timestep.count {
            return Err(FactoryError::InvalidWeather {
                what: format!(
                    "{} has {} values, timestep has {}",
                    variable.name(),
                    values.len(),
                    self.timestep.count
                ),
            });
        }
        self.variables.insert(variable, values);
        Ok(())
    }

    pub fn with(mut self, variable: WeatherVariable, values: Vec<f64>) -> FactoryResult<Self> {
        self.insert(variable, values)?;
        Ok(self)
    }

    pub fn validate(&self) -> FactoryResult<()> {
        self.location.validate()?;
        if self.timestep.interval_minutes == 0 {
            return Err(FactoryError::InvalidWeather {
                what: "interval_minutes must be positive".to_string(),
            });
        }
        for (variable, values) in &self.variables {
            if values.len() != self.timestep.count {
                return Err(FactoryError::InvalidWeather {
                    what: format!(
                        "{} has {} values, timestep has {}",
                        variable.name(),
                        values.len(),
                        self.timestep.count
                    ),
                });
            }
            for v in values {
                ensure_finite(*v, variable.name())?;
            }
        }
        Ok(())
    }

    /// Hourly clear-sky record of `days` days from `start`.
    ///
    /// Temperature follows an annual cosine (peak late July) of
    /// `annual_amplitude` around `mean_temp` plus a daily cycle peaking at
    /// 14:00. Irradiance comes from the actual sun position at the site.
    pub fn synthetic(
        location: Location,
        start: NaiveDateTime,
        days: usize,
        mean_temp: f64,
        annual_amplitude: f64,
    ) -> FactoryResult<Self> {
        use chrono::{Datelike, Timelike};

        let timestep = Timestep::hourly(start, days * 24);
        let mut data = Self::new(location, timestep);
        let positions = data.solar_positions();

        let n = timestep.count;
        let mut db = Vec::with_capacity(n);
        let mut rh = Vec::with_capacity(n);
        let mut wind = Vec::with_capacity(n);
        let mut dir = Vec::with_capacity(n);
        let mut diff = Vec::with_capacity(n);
        let mut ir = Vec::with_capacity(n);

        for (i, sun) in positions.iter().enumerate() {
            let t = timestep.datetime_at(i);
            let day_of_year = f64::from(t.ordinal());
            let hour = f64::from(t.hour()) + 0.5;
            let annual = 2.0 * PI * (day_of_year - 200.0) / 365.0;
            let daily = 2.0 * PI * (hour - 14.0) / 24.0;

            let temp = mean_temp
                + annual_amplitude * annual.cos()
                + SYNTHETIC_DAILY_SWING * daily.cos();
            db.push(temp);
            rh.push(60.0 - 20.0 * daily.cos());
            wind.push(3.0 + daily.cos());

            // ASHRAE clear-sky style beam attenuation.
            let (beam, diffuse) = if sun.is_above_horizon() {
                let sin_alt = sun.altitude.to_radians().sin();
                let beam = 1000.0 * (-0.2 / sin_alt.max(0.05)).exp();
                (beam, 0.12 * beam)
            } else {
                (0.0, 0.0)
            };
            dir.push(beam);
            diff.push(diffuse);

            let sky_emissivity = 0.8;
            ir.push(sky_emissivity * STEFAN_BOLTZMANN * (temp + ZERO_CELSIUS_K).powi(4));
        }

        data.insert(WeatherVariable::DryBulbTemperature, db)?;
        data.insert(WeatherVariable::RelativeHumidity, rh)?;
        data.insert(WeatherVariable::WindSpeed, wind)?;
        data.insert(WeatherVariable::DirectNormalRadiation, dir)?;
        data.insert(WeatherVariable::DiffuseHorizontalRadiation, diff)?;
        data.insert(WeatherVariable::HorizontalInfraredRadiation, ir)?;
        Ok(data)
    }
}

impl WeatherSource for WeatherData {
    fn timestep(&self) -> &Timestep {
        &self.timestep
    }

    fn variable(&self, variable: WeatherVariable) -> Option<&[f64]> {
        self.variables.get(&variable).map(Vec::as_slice)
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn insert_rejects_wrong_length() {
        let mut data = WeatherData::new(Location::default(), Timestep::hourly(start(), 24));
        assert!(data.insert(WeatherVariable::WindSpeed, vec![1.0; 23]).is_err());
        assert!(data.insert(WeatherVariable::WindSpeed, vec![1.0; 24]).is_ok());
    }

    #[test]
    fn missing_variable_is_reported_by_name() {
        let data = WeatherData::new(Location::default(), Timestep::hourly(start(), 24));
        match data.series(WeatherVariable::RelativeHumidity) {
            Err(FactoryError::MissingInput { what }) => assert_eq!(what, "relative_humidity"),
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn synthetic_has_sun_only_by_day() {
        let site = Location {
            latitude: 40.0,
            longitude: -75.0,
            time_zone: -5.0,
            ..Location::default()
        };
        let data = WeatherData::synthetic(site, start(), 2, 12.0, 10.0).unwrap();
        data.validate().unwrap();
        let dir = data.variable(WeatherVariable::DirectNormalRadiation).unwrap();
        assert_eq!(dir.len(), 48);
        assert_eq!(dir[2], 0.0);
        assert!(dir[12] > 500.0);
        let db = data.variable(WeatherVariable::DryBulbTemperature).unwrap();
        assert!(db[14] > db[4]);
    }

    #[test]
    fn validate_rejects_bad_location_and_nan() {
        let mut data = WeatherData::new(Location::default(), Timestep::hourly(start(), 2));
        data.insert(WeatherVariable::DryBulbTemperature, vec![20.0, f64::NAN])
            .unwrap();
        assert!(data.validate().is_err());

        let mut data = WeatherData::new(
            Location {
                latitude: 95.0,
                ..Location::default()
            },
            Timestep::hourly(start(), 1),
        );
        data.insert(WeatherVariable::DryBulbTemperature, vec![20.0])
            .unwrap();
        assert!(data.validate().is_err());
    }

    #[test]
    fn yaml_round_trip_keeps_variables() {
        let data = WeatherData::new(Location::default(), Timestep::hourly(start(), 2))
            .with(WeatherVariable::DryBulbTemperature, vec![20.0, 21.0])
            .unwrap();
        let text = serde_yaml::to_string(&data).unwrap();
        assert!(text.contains("dry_bulb_temperature"));
        let back: WeatherData = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn site_pressure_drops_with_elevation() {
        let sea = Location::default();
        assert_eq!(sea.standard_pressure(), STANDARD_PRESSURE_PA);
        let high = Location {
            elevation: 1000.0,
            ..Location::default()
        };
        assert!((high.standard_pressure() - 89_874.5).abs() < 1.0);
    }
}
