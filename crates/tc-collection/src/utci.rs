//! UTCI comfort collection.

use crate::error::CollectionResult;
use crate::input::{Exposure, Input, aligned_header};
use crate::summary::{ComfortSeries, percent_where};
use rayon::prelude::*;
use tc_core::{TimeSeries, Timestep};
use tc_criteria::{StressScale, ThermalCondition, UtciCategory, UtciParameter};
use tc_models::{UtciOutput, utci_evaluate};
use tracing::{debug, info};

/// Wind speed (m/s) assumed when none is given; the UTCI lower bound.
pub const DEFAULT_WIND_SPEED: f64 = 0.5;

/// Inputs of a [`UtciCollection`]. Missing radiant temperature defaults to
/// air temperature and missing wind to [`DEFAULT_WIND_SPEED`].
#[derive(Debug, Clone, Copy)]
pub struct UtciSeries<'a> {
    pub air_temperature: &'a TimeSeries<f64>,
    pub rel_humidity: Input<'a>,
    pub rad_temperature: Option<Input<'a>>,
    pub wind_speed: Option<Input<'a>>,
    pub exposure: Exposure,
}

impl<'a> UtciSeries<'a> {
    pub fn new(air_temperature: &'a TimeSeries<f64>, rel_humidity: impl Into<Input<'a>>) -> Self {
        Self {
            air_temperature,
            rel_humidity: rel_humidity.into(),
            rad_temperature: None,
            wind_speed: None,
            exposure: Exposure::default(),
        }
    }

    pub fn with_rad_temperature(mut self, tr: impl Into<Input<'a>>) -> Self {
        self.rad_temperature = Some(tr.into());
        self
    }

    pub fn with_wind_speed(mut self, wind: impl Into<Input<'a>>) -> Self {
        self.wind_speed = Some(wind.into());
        self.exposure.wind = true;
        self
    }

    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }
}

#[derive(Debug, Clone)]
pub struct UtciCollection {
    header: Timestep,
    parameter: UtciParameter,
    exposure: Exposure,
    utci: TimeSeries<f64>,
    wind_clamped: TimeSeries<bool>,
    is_comfortable: TimeSeries<bool>,
    thermal_condition: TimeSeries<ThermalCondition>,
    category: TimeSeries<UtciCategory>,
}

impl UtciCollection {
    /// Evaluates UTCI at every timestep.
    pub fn new(inputs: UtciSeries<'_>, parameter: UtciParameter) -> CollectionResult<Self> {
        let header = aligned_header(
            "air_temperature",
            inputs.air_temperature,
            &[
                ("rel_humidity", Some(inputs.rel_humidity)),
                ("rad_temperature", inputs.rad_temperature),
                ("wind_speed", inputs.wind_speed),
            ],
        )?;

        let ta = inputs.air_temperature.values();
        let tr = inputs.rad_temperature;
        let wind = inputs.wind_speed.unwrap_or(Input::Constant(DEFAULT_WIND_SPEED));
        let rh = inputs.rel_humidity;

        let outputs: Vec<UtciOutput> = (0..header.count)
            .into_par_iter()
            .map(|i| {
                let tr_i = tr.map_or(ta[i], |t| t.at(i));
                utci_evaluate(ta[i], tr_i, wind.at(i), rh.at(i))
            })
            .collect();

        let clamped = outputs.iter().filter(|o| o.wind_clamped).count();
        if clamped > 0 {
            debug!(clamped, "UTCI wind speed clamped to the regression range");
        }

        let utci = outputs.iter().map(|o| o.utci).collect();
        let wind_clamped = outputs.iter().map(|o| o.wind_clamped).collect();
        let collection = Self::assemble(header, utci, wind_clamped, parameter, inputs.exposure)?;
        info!(model = "UTCI", len = header.count, "comfort collection built");
        Ok(collection)
    }

    /// Classifies a precomputed UTCI series.
    pub fn from_index(utci: TimeSeries<f64>, parameter: UtciParameter) -> CollectionResult<Self> {
        let header = aligned_header("utci", &utci, &[])?;
        let wind_clamped = vec![false; header.count];
        Self::assemble(header, utci.into_values(), wind_clamped, parameter, Exposure::default())
    }

    fn assemble(
        header: Timestep,
        utci: Vec<f64>,
        wind_clamped: Vec<bool>,
        parameter: UtciParameter,
        exposure: Exposure,
    ) -> CollectionResult<Self> {
        let utci = TimeSeries::new(header, utci)?;
        let is_comfortable = utci.map(|v| parameter.is_comfortable(*v));
        let thermal_condition = utci.map(|v| parameter.thermal_condition(*v));
        let category = utci.map(|v| parameter.category(*v));
        Ok(Self {
            header,
            parameter,
            exposure,
            wind_clamped: TimeSeries::new(header, wind_clamped)?,
            utci,
            is_comfortable,
            thermal_condition,
            category,
        })
    }

    pub fn parameter(&self) -> &UtciParameter {
        &self.parameter
    }

    pub fn universal_thermal_climate_index(&self) -> &TimeSeries<f64> {
        &self.utci
    }

    /// Steps where wind was clamped into the regression range.
    pub fn wind_clamped(&self) -> &TimeSeries<bool> {
        &self.wind_clamped
    }

    /// Eleven-point stress category of every step.
    pub fn category(&self) -> &TimeSeries<UtciCategory> {
        &self.category
    }

    pub fn stress_levels(&self, scale: StressScale) -> TimeSeries<i8> {
        self.utci.map(|v| self.parameter.stress_level(scale, *v))
    }

    pub fn percent_in_category(&self, category: UtciCategory) -> f64 {
        percent_where(&self.category, |c| *c == category)
    }

    /// Percent of time in each of the eleven stress categories.
    pub fn stress_breakdown(&self) -> Vec<(UtciCategory, f64)> {
        UtciCategory::ALL
            .iter()
            .map(|c| (*c, self.percent_in_category(*c)))
            .collect()
    }
}

impl ComfortSeries for UtciCollection {
    fn model(&self) -> &'static str {
        "UTCI"
    }

    fn header(&self) -> &Timestep {
        &self.header
    }

    fn index(&self) -> &TimeSeries<f64> {
        &self.utci
    }

    fn is_comfortable(&self) -> &TimeSeries<bool> {
        &self.is_comfortable
    }

    fn thermal_condition(&self) -> &TimeSeries<ThermalCondition> {
        &self.thermal_condition
    }

    fn exposure(&self) -> Exposure {
        self.exposure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectionError;
    use chrono::NaiveDate;

    fn header(count: usize) -> Timestep {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Timestep::hourly(start, count)
    }

    fn series(values: Vec<f64>) -> TimeSeries<f64> {
        TimeSeries::new(header(values.len()), values).unwrap()
    }

    #[test]
    fn reference_point_every_step() {
        let ta = series(vec![20.0; 4]);
        let coll = UtciCollection::new(UtciSeries::new(&ta, 50.0), UtciParameter::default())
            .unwrap();
        assert_eq!(coll.len(), 4);
        for v in coll.universal_thermal_climate_index().values() {
            assert!((v - 19.8476).abs() < 0.01);
        }
        assert_eq!(coll.percent_comfortable(), 100.0);
        assert_eq!(coll.percent_neutral(), 100.0);
        assert!(!coll.exposure().wind);
    }

    #[test]
    fn hot_cold_split() {
        let ta = series(vec![-20.0, 0.0, 20.0, 40.0]);
        let coll = UtciCollection::new(
            UtciSeries::new(&ta, 50.0).with_wind_speed(1.0),
            UtciParameter::default(),
        )
        .unwrap();
        assert!(coll.exposure().wind);
        assert_eq!(coll.percent_cold(), 50.0);
        assert_eq!(coll.percent_neutral(), 25.0);
        assert_eq!(coll.percent_hot(), 25.0);
        assert_eq!(coll.percent_uncomfortable(), 75.0);
        let total: f64 = coll.stress_breakdown().iter().map(|(_, p)| p).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn calm_wind_flagged() {
        let ta = series(vec![20.0, 20.0]);
        let wind = series(vec![0.1, 2.0]);
        let coll = UtciCollection::new(
            UtciSeries::new(&ta, 50.0).with_wind_speed(&wind),
            UtciParameter::default(),
        )
        .unwrap();
        assert_eq!(coll.wind_clamped().values(), &[true, false]);
    }

    #[test]
    fn from_index_classifies() {
        let utci = series(vec![-45.0, 5.0, 20.0, 27.0, 50.0]);
        let coll = UtciCollection::from_index(utci, UtciParameter::default()).unwrap();
        assert_eq!(
            coll.category().values(),
            &[
                UtciCategory::ExtremeColdStress,
                UtciCategory::SlightColdStress,
                UtciCategory::NoThermalStress,
                UtciCategory::SlightHeatStress,
                UtciCategory::ExtremeHeatStress,
            ]
        );
        assert_eq!(coll.percent_in_category(UtciCategory::NoThermalStress), 20.0);
        assert_eq!(
            coll.stress_levels(StressScale::FivePoint).values(),
            &[-2, -1, 0, 1, 2]
        );
    }

    #[test]
    fn empty_series_rejected() {
        let empty = series(vec![]);
        let err = UtciCollection::new(UtciSeries::new(&empty, 50.0), UtciParameter::default())
            .unwrap_err();
        assert!(matches!(err, CollectionError::EmptyInput { .. }));
        assert!(UtciCollection::from_index(series(vec![]), UtciParameter::default()).is_err());
    }
}
