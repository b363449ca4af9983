//! Adaptive comfort collection.

use crate::error::CollectionResult;
use crate::input::{Exposure, Input, aligned_header};
use crate::summary::ComfortSeries;
use rayon::prelude::*;
use tc_core::{CoreError, TimeSeries, Timestep, check_aligned};
use tc_criteria::{AdaptiveParameter, PrevailingMethod, ThermalCondition};
use tc_models::adaptive::{
    DEFAULT_RUNNING_MEAN_ALPHA, monthly_average_prevailing, t_operative,
    weighted_running_mean_daily, weighted_running_mean_hourly,
};
use tracing::info;

/// Air speed (m/s) assumed when none is given.
pub const DEFAULT_AIR_SPEED: f64 = 0.1;

/// Source of the prevailing outdoor temperature.
#[derive(Debug, Clone, Copy)]
pub enum Prevailing<'a> {
    /// Prevailing temperature per step, already computed.
    Given(Input<'a>),
    /// Recorded outdoor temperature, reduced by the parameter's
    /// [`PrevailingMethod`].
    Outdoor(&'a TimeSeries<f64>),
}

/// Prevailing temperature of every step from recorded outdoor temperature.
pub fn prevailing_from_outdoor(
    outdoor: &TimeSeries<f64>,
    method: PrevailingMethod,
) -> CollectionResult<Vec<f64>> {
    let header = outdoor.header();
    let values = outdoor.values();
    let prevailing = match method {
        PrevailingMethod::MonthlyAverage => monthly_average_prevailing(values, header.months())?,
        PrevailingMethod::RunningMean if header.interval_minutes == 60 => {
            weighted_running_mean_hourly(values, DEFAULT_RUNNING_MEAN_ALPHA)?
        }
        PrevailingMethod::RunningMean => {
            let per_day = header
                .steps_per_day()
                .filter(|s| values.len() % s == 0)
                .ok_or(CoreError::InvalidArg {
                    what: "running mean needs whole days of outdoor temperature",
                })?;
            let daily: Vec<f64> = values
                .chunks_exact(per_day)
                .map(|day| day.iter().sum::<f64>() / per_day as f64)
                .collect();
            weighted_running_mean_daily(&daily, DEFAULT_RUNNING_MEAN_ALPHA)?
                .into_iter()
                .flat_map(|v| std::iter::repeat_n(v, per_day))
                .collect()
        }
    };
    Ok(prevailing)
}

#[derive(Debug, Clone)]
pub struct AdaptiveCollection {
    header: Timestep,
    parameter: AdaptiveParameter,
    exposure: Exposure,
    prevailing: TimeSeries<f64>,
    operative: TimeSeries<f64>,
    neutral_temperature: TimeSeries<f64>,
    degrees_from_neutral: TimeSeries<f64>,
    cooling_effect: TimeSeries<f64>,
    is_comfortable: TimeSeries<bool>,
    thermal_condition: TimeSeries<ThermalCondition>,
}

impl AdaptiveCollection {
    pub fn new(
        prevailing: Prevailing<'_>,
        operative_temperature: &TimeSeries<f64>,
        air_speed: Option<Input<'_>>,
        parameter: AdaptiveParameter,
    ) -> CollectionResult<Self> {
        let given = match prevailing {
            Prevailing::Given(input) => Some(input),
            Prevailing::Outdoor(_) => None,
        };
        let header = aligned_header(
            "operative_temperature",
            operative_temperature,
            &[("prevailing_temperature", given), ("air_speed", air_speed)],
        )?;

        let prevailing = match prevailing {
            Prevailing::Given(input) => (0..header.count).map(|i| input.at(i)).collect(),
            Prevailing::Outdoor(outdoor) => {
                check_aligned(&header, &[("outdoor_temperature", outdoor)])?;
                prevailing_from_outdoor(outdoor, parameter.prevailing_method())?
            }
        };
        let to = operative_temperature.values();
        let vel = air_speed.unwrap_or(Input::Constant(DEFAULT_AIR_SPEED));

        let steps: Vec<(f64, f64, bool, ThermalCondition)> = (0..header.count)
            .into_par_iter()
            .map(|i| {
                let result = parameter.comfort(prevailing[i], to[i]);
                let ce = parameter.cooling_effect(vel.at(i), to[i]);
                (
                    result.t_comf,
                    ce,
                    parameter.is_comfortable(&result, ce),
                    parameter.thermal_condition(&result, ce),
                )
            })
            .collect();

        let neutral: Vec<f64> = steps.iter().map(|s| s.0).collect();
        let degrees = to.iter().zip(&neutral).map(|(t, n)| t - n).collect();
        let collection = Self {
            header,
            parameter,
            exposure: Exposure::default(),
            prevailing: TimeSeries::new(header, prevailing)?,
            operative: operative_temperature.clone(),
            degrees_from_neutral: TimeSeries::new(header, degrees)?,
            neutral_temperature: TimeSeries::new(header, neutral)?,
            cooling_effect: TimeSeries::new(header, steps.iter().map(|s| s.1).collect())?,
            is_comfortable: TimeSeries::new(header, steps.iter().map(|s| s.2).collect())?,
            thermal_condition: TimeSeries::new(header, steps.iter().map(|s| s.3).collect())?,
        };
        info!(
            model = "Adaptive",
            standard = parameter.standard().name(),
            len = header.count,
            "comfort collection built"
        );
        Ok(collection)
    }

    /// Builds from air temperature and, if given, radiant temperature.
    pub fn from_air_and_rad_temp(
        prevailing: Prevailing<'_>,
        air_temperature: &TimeSeries<f64>,
        rad_temperature: Option<&TimeSeries<f64>>,
        air_speed: Option<Input<'_>>,
        parameter: AdaptiveParameter,
    ) -> CollectionResult<Self> {
        let operative = match rad_temperature {
            Some(tr) => {
                check_aligned(air_temperature.header(), &[("rad_temperature", tr)])?;
                let values = air_temperature
                    .values()
                    .iter()
                    .zip(tr.values())
                    .map(|(ta, tr)| t_operative(*ta, *tr))
                    .collect();
                TimeSeries::new(*air_temperature.header(), values)?
            }
            None => air_temperature.clone(),
        };
        Self::new(prevailing, &operative, air_speed, parameter)
    }

    /// Records the exposure the inputs were built with.
    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn parameter(&self) -> &AdaptiveParameter {
        &self.parameter
    }

    pub fn prevailing_outdoor_temperature(&self) -> &TimeSeries<f64> {
        &self.prevailing
    }

    pub fn operative_temperature(&self) -> &TimeSeries<f64> {
        &self.operative
    }

    pub fn neutral_temperature(&self) -> &TimeSeries<f64> {
        &self.neutral_temperature
    }

    pub fn degrees_from_neutral(&self) -> &TimeSeries<f64> {
        &self.degrees_from_neutral
    }

    pub fn cooling_effect(&self) -> &TimeSeries<f64> {
        &self.cooling_effect
    }
}

impl ComfortSeries for AdaptiveCollection {
    fn model(&self) -> &'static str {
        "Adaptive"
    }

    fn header(&self) -> &Timestep {
        &self.header
    }

    fn index(&self) -> &TimeSeries<f64> {
        &self.degrees_from_neutral
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
