//! PMV comfort collection, with SET and the elevated air speed correction.

use crate::error::{CollectionError, CollectionResult};
use crate::input::{Exposure, Input, aligned_header};
use crate::summary::{ComfortSeries, percent_where};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tc_core::units::constants::standard_pressure;
use tc_core::{TimeSeries, Timestep};
use tc_criteria::{DiscomfortReason, PmvParameter, ThermalCondition};
use tc_models::adaptive::t_operative;
use tc_models::psychrometrics::humid_ratio_from_db_rh;
use tc_models::{
    HeatLoss, PmvResult, SetConfig, ThermalInputs, ppd_from_pmv, predicted_mean_vote,
};
use tc_solver::Convergence;
use tracing::{info, warn};

pub const DEFAULT_AIR_SPEED: f64 = 0.1;
pub const DEFAULT_MET_RATE: f64 = 1.1;
pub const DEFAULT_CLO_VALUE: f64 = 0.7;
pub const DEFAULT_EXTERNAL_WORK: f64 = 0.0;

/// Inputs of a [`PmvCollection`]; unset optional inputs take the defaults
/// above, and radiant temperature defaults to air temperature.
#[derive(Debug, Clone, Copy)]
pub struct PmvSeries<'a> {
    pub air_temperature: &'a TimeSeries<f64>,
    pub rel_humidity: Input<'a>,
    pub rad_temperature: Option<Input<'a>>,
    pub air_speed: Option<Input<'a>>,
    pub met_rate: Option<Input<'a>>,
    pub clo_value: Option<Input<'a>>,
    pub external_work: Option<Input<'a>>,
    pub exposure: Exposure,
    pub set_config: SetConfig,
}

impl<'a> PmvSeries<'a> {
    pub fn new(air_temperature: &'a TimeSeries<f64>, rel_humidity: impl Into<Input<'a>>) -> Self {
        Self {
            air_temperature,
            rel_humidity: rel_humidity.into(),
            rad_temperature: None,
            air_speed: None,
            met_rate: None,
            clo_value: None,
            external_work: None,
            exposure: Exposure::default(),
            set_config: SetConfig::default(),
        }
    }

    pub fn with_rad_temperature(mut self, tr: impl Into<Input<'a>>) -> Self {
        self.rad_temperature = Some(tr.into());
        self
    }

    pub fn with_air_speed(mut self, vel: impl Into<Input<'a>>) -> Self {
        self.air_speed = Some(vel.into());
        self
    }

    pub fn with_met_rate(mut self, met: impl Into<Input<'a>>) -> Self {
        self.met_rate = Some(met.into());
        self
    }

    pub fn with_clo_value(mut self, clo: impl Into<Input<'a>>) -> Self {
        self.clo_value = Some(clo.into());
        self
    }

    pub fn with_external_work(mut self, wme: impl Into<Input<'a>>) -> Self {
        self.external_work = Some(wme.into());
        self
    }

    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn with_set_config(mut self, config: SetConfig) -> Self {
        self.set_config = config;
        self
    }

    fn step(&self, i: usize) -> ThermalInputs {
        let ta = self.air_temperature.values()[i];
        let at = |input: Option<Input<'_>>, default: f64| input.map_or(default, |v| v.at(i));
        ThermalInputs {
            ta,
            tr: at(self.rad_temperature, ta),
            vel: at(self.air_speed, DEFAULT_AIR_SPEED),
            rh: self.rel_humidity.at(i),
            met: at(self.met_rate, DEFAULT_MET_RATE),
            clo: at(self.clo_value, DEFAULT_CLO_VALUE),
            wme: at(self.external_work, DEFAULT_EXTERNAL_WORK),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeatLossTerm {
    Conduction,
    Sweating,
    LatentRespiration,
    DryRespiration,
    Radiation,
    Convection,
}

impl HeatLossTerm {
    fn of(&self, hl: &HeatLoss) -> f64 {
        match self {
            HeatLossTerm::Conduction => hl.cond,
            HeatLossTerm::Sweating => hl.sweat,
            HeatLossTerm::LatentRespiration => hl.res_l,
            HeatLossTerm::DryRespiration => hl.res_s,
            HeatLossTerm::Radiation => hl.rad,
            HeatLossTerm::Convection => hl.conv,
        }
    }
}

struct Step {
    inputs: ThermalInputs,
    result: PmvResult,
}

fn column<T>(
    header: Timestep,
    steps: &[Step],
    f: impl Fn(&Step) -> T,
) -> CollectionResult<TimeSeries<T>> {
    Ok(TimeSeries::new(header, steps.iter().map(f).collect())?)
}

/// Series only available when the collection was built from raw inputs.
#[derive(Debug, Clone)]
pub struct PmvDetail {
    pub standard_effective_temperature: TimeSeries<f64>,
    /// False where SET did not converge; at still air PMV is still valid.
    pub set_converged: TimeSeries<bool>,
    pub adjusted_air_temperature: TimeSeries<f64>,
    pub cooling_effect: TimeSeries<f64>,
    pub operative_temperature: TimeSeries<f64>,
    pub heat_loss: TimeSeries<HeatLoss>,
}

#[derive(Debug, Clone)]
pub struct PmvCollection {
    header: Timestep,
    parameter: PmvParameter,
    exposure: Exposure,
    pmv: TimeSeries<f64>,
    ppd: TimeSeries<f64>,
    detail: Option<PmvDetail>,
    humidity_ratio: Option<TimeSeries<f64>>,
    converged: TimeSeries<bool>,
    is_comfortable: TimeSeries<bool>,
    thermal_condition: TimeSeries<ThermalCondition>,
    discomfort_reason: TimeSeries<DiscomfortReason>,
}

impl PmvCollection {
    /// Evaluates PMV (and SET) at every timestep.
    ///
    /// Steps whose PMV did not converge are kept, flagged in
    /// [`Self::converged`] and classified as unresolved. At still air a SET
    /// failure only shows in [`PmvDetail::set_converged`].
    pub fn new(inputs: PmvSeries<'_>, parameter: PmvParameter) -> CollectionResult<Self> {
        let header = aligned_header(
            "air_temperature",
            inputs.air_temperature,
            &[
                ("rel_humidity", Some(inputs.rel_humidity)),
                ("rad_temperature", inputs.rad_temperature),
                ("air_speed", inputs.air_speed),
                ("met_rate", inputs.met_rate),
                ("clo_value", inputs.clo_value),
                ("external_work", inputs.external_work),
            ],
        )?;
        let still_air = parameter.still_air_threshold();
        let needs_hr = parameter.requires_humidity_ratio();

        let steps: Vec<Step> = (0..header.count)
            .into_par_iter()
            .map(|i| {
                let step = inputs.step(i);
                let result = predicted_mean_vote(&step, still_air, &inputs.set_config);
                Step {
                    inputs: step,
                    result,
                }
            })
            .collect();

        for (i, step) in steps.iter().enumerate() {
            if let Convergence::NonConverged { iterations, stage } = step.result.convergence {
                warn!(step = i, iterations, stage, "PMV did not converge");
            }
        }

        let pmv = column(header, &steps, |s| s.result.pmv)?;
        let ppd = column(header, &steps, |s| s.result.ppd)?;
        let detail = PmvDetail {
            standard_effective_temperature: column(header, &steps, |s| s.result.set)?,
            set_converged: column(header, &steps, |s| s.result.set_convergence.is_converged())?,
            adjusted_air_temperature: column(header, &steps, |s| s.result.ta_adj)?,
            cooling_effect: column(header, &steps, |s| s.result.cooling_effect)?,
            operative_temperature: column(header, &steps, |s| {
                t_operative(s.inputs.ta, s.inputs.tr)
            })?,
            heat_loss: column(header, &steps, |s| s.result.heat_loss)?,
        };
        let humidity_ratio = needs_hr
            .then(|| {
                column(header, &steps, |s| {
                    humid_ratio_from_db_rh(s.inputs.ta, s.inputs.rh, standard_pressure())
                })
            })
            .transpose()?;
        let converged = column(header, &steps, |s| s.result.convergence.is_converged())?;

        let collection = Self::assemble(
            header,
            parameter,
            inputs.exposure,
            pmv,
            ppd,
            Some(detail),
            humidity_ratio,
            converged,
        )?;
        info!(
            model = "PMV",
            len = header.count,
            unresolved = collection.percent_unresolved(),
            "comfort collection built"
        );
        Ok(collection)
    }

    /// Classifies a precomputed PMV series; PPD follows from PMV.
    ///
    /// Fails when the parameter constrains humidity, since the humidity ratio
    /// cannot be recovered from PMV alone.
    pub fn from_index(pmv: TimeSeries<f64>, parameter: PmvParameter) -> CollectionResult<Self> {
        let header = aligned_header("pmv", &pmv, &[])?;
        if parameter.requires_humidity_ratio() {
            return Err(CollectionError::MissingInput {
                what: "humidity ratio (air temperature and humidity) for a humidity-limited PMV parameter"
                    .to_string(),
            });
        }
        let ppd = pmv.map(|v| ppd_from_pmv(*v));
        let converged = TimeSeries::constant(header, true);
        Self::assemble(
            header,
            parameter,
            Exposure::default(),
            pmv,
            ppd,
            None,
            None,
            converged,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        header: Timestep,
        parameter: PmvParameter,
        exposure: Exposure,
        pmv: TimeSeries<f64>,
        ppd: TimeSeries<f64>,
        detail: Option<PmvDetail>,
        humidity_ratio: Option<TimeSeries<f64>>,
        converged: TimeSeries<bool>,
    ) -> CollectionResult<Self> {
        let mut is_comfortable = Vec::with_capacity(header.count);
        let mut thermal_condition = Vec::with_capacity(header.count);
        let mut discomfort_reason = Vec::with_capacity(header.count);
        for i in 0..header.count {
            let (pmv_i, ppd_i) = (pmv.values()[i], ppd.values()[i]);
            if !converged.values()[i] {
                is_comfortable.push(false);
                thermal_condition.push(ThermalCondition::Unresolved);
                discomfort_reason.push(DiscomfortReason::Unresolved);
                continue;
            }
            let hr = humidity_ratio
                .as_ref()
                .map_or(parameter.humid_ratio_lower(), |h| h.values()[i]);
            is_comfortable.push(parameter.is_comfortable(ppd_i, hr));
            thermal_condition.push(parameter.thermal_condition(pmv_i, ppd_i));
            discomfort_reason.push(parameter.discomfort_reason(pmv_i, ppd_i, hr));
        }
        Ok(Self {
            header,
            parameter,
            exposure,
            pmv,
            ppd,
            detail,
            humidity_ratio,
            converged,
            is_comfortable: TimeSeries::new(header, is_comfortable)?,
            thermal_condition: TimeSeries::new(header, thermal_condition)?,
            discomfort_reason: TimeSeries::new(header, discomfort_reason)?,
        })
    }

    pub fn parameter(&self) -> &PmvParameter {
        &self.parameter
    }

    pub fn predicted_mean_vote(&self) -> &TimeSeries<f64> {
        &self.pmv
    }

    pub fn percentage_people_dissatisfied(&self) -> &TimeSeries<f64> {
        &self.ppd
    }

    pub fn detail(&self) -> Option<&PmvDetail> {
        self.detail.as_ref()
    }

    pub fn standard_effective_temperature(&self) -> Option<&TimeSeries<f64>> {
        self.detail.as_ref().map(|d| &d.standard_effective_temperature)
    }

    pub fn heat_loss(&self, term: HeatLossTerm) -> Option<TimeSeries<f64>> {
        self.detail
            .as_ref()
            .map(|d| d.heat_loss.map(|hl| term.of(hl)))
    }

    /// Present only when the parameter limits humidity ratio.
    pub fn humidity_ratio(&self) -> Option<&TimeSeries<f64>> {
        self.humidity_ratio.as_ref()
    }

    /// False where the model did not converge.
    pub fn converged(&self) -> &TimeSeries<bool> {
        &self.converged
    }

    pub fn discomfort_reason(&self) -> &TimeSeries<DiscomfortReason> {
        &self.discomfort_reason
    }

    pub fn percent_dry(&self) -> f64 {
        percent_where(&self.discomfort_reason, |r| *r == DiscomfortReason::TooDry)
    }

    pub fn percent_humid(&self) -> f64 {
        percent_where(&self.discomfort_reason, |r| *r == DiscomfortReason::TooHumid)
    }
}

impl ComfortSeries for PmvCollection {
    fn model(&self) -> &'static str {
        "PMV"
    }

    fn header(&self) -> &Timestep {
        &self.header
    }

    fn index(&self) -> &TimeSeries<f64> {
        &self.pmv
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
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> TimeSeries<f64> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        TimeSeries::new(Timestep::hourly(start, values.len()), values).unwrap()
    }

    #[test]
    fn neutral_office() {
        let ta = series(vec![24.0; 3]);
        let inputs = PmvSeries::new(&ta, 50.0).with_met_rate(1.1).with_clo_value(0.7);
        let coll = PmvCollection::new(inputs, PmvParameter::default()).unwrap();
        for v in coll.predicted_mean_vote().values() {
            assert!((v + 0.0536).abs() < 0.01, "pmv = {v}");
        }
        let set = coll.standard_effective_temperature().unwrap();
        assert!((set.values()[0] - 25.0695).abs() < 0.05);
        assert_eq!(coll.percent_comfortable(), 100.0);
        assert_eq!(coll.percent_unresolved(), 0.0);
        assert!(coll.humidity_ratio().is_none());
        assert!(coll.converged().values().iter().all(|c| *c));
    }

    #[test]
    fn heat_loss_series() {
        let ta = series(vec![19.0]);
        let tr = series(vec![23.0]);
        let inputs = PmvSeries::new(&ta, 60.0)
            .with_rad_temperature(&tr)
            .with_met_rate(1.5)
            .with_clo_value(0.4);
        let coll = PmvCollection::new(inputs, PmvParameter::default()).unwrap();
        let cond = coll.heat_loss(HeatLossTerm::Conduction).unwrap();
        assert!((cond.values()[0] - 11.607).abs() < 0.12);
        let op = &coll.detail().unwrap().operative_temperature;
        assert_eq!(op.values()[0], 21.0);
        assert_eq!(coll.percent_cold(), 100.0);
    }

    #[test]
    fn humidity_limits() {
        let ta = series(vec![24.0, 24.0]);
        let rh = series(vec![10.0, 90.0]);
        let parameter = PmvParameter::new(10.0, 0.012, 0.004, 0.1).unwrap();
        let coll = PmvCollection::new(PmvSeries::new(&ta, &rh), parameter).unwrap();
        let hr = coll.humidity_ratio().unwrap().values();
        assert!(hr[0] > 0.0 && hr[0] < 0.004, "{hr:?}");
        assert!(hr[1] > 0.012, "{hr:?}");
        assert_eq!(coll.percent_dry(), 50.0);
        assert_eq!(coll.percent_humid(), 50.0);
        assert_eq!(coll.percent_comfortable(), 0.0);
        assert_eq!(coll.percent_neutral(), 100.0);
    }

    #[test]
    fn non_convergence_is_unresolved() {
        let ta = series(vec![24.0, 24.0]);
        let inputs = PmvSeries::new(&ta, 50.0)
            .with_air_speed(0.5)
            .with_set_config(SetConfig {
                max_clothing_iterations: 0,
                max_newton_iterations: 0,
            });
        let coll = PmvCollection::new(inputs, PmvParameter::default()).unwrap();
        assert_eq!(coll.percent_unresolved(), 100.0);
        assert_eq!(coll.percent_comfortable(), 0.0);
        assert_eq!(
            coll.discomfort_reason().values(),
            &[DiscomfortReason::Unresolved, DiscomfortReason::Unresolved]
        );
        let sum = coll.percent_neutral() + coll.percent_hot() + coll.percent_cold()
            + coll.percent_unresolved();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn still_air_set_failure_stays_resolved() {
        let ta = series(vec![22.0, 22.0]);
        let inputs = PmvSeries::new(&ta, 50.0)
            .with_air_speed(0.05)
            .with_set_config(SetConfig {
                max_clothing_iterations: 1,
                max_newton_iterations: 0,
            });
        let coll = PmvCollection::new(inputs, PmvParameter::default()).unwrap();
        assert_eq!(coll.percent_unresolved(), 0.0);
        assert!(coll.converged().values().iter().all(|c| *c));
        let detail = coll.detail().unwrap();
        assert!(detail.set_converged.values().iter().all(|c| !*c));
        for v in coll.predicted_mean_vote().values() {
            assert!((v + 0.6078).abs() < 0.01, "pmv = {v}");
        }
    }

    #[test]
    fn from_index() {
        let coll =
            PmvCollection::from_index(series(vec![0.0, 1.0, -1.0, 0.2]), PmvParameter::default())
                .unwrap();
        assert_eq!(coll.percent_neutral(), 50.0);
        assert_eq!(coll.percent_hot(), 25.0);
        assert_eq!(coll.percent_cold(), 25.0);
        assert!(coll.detail().is_none());

        let limited = PmvParameter::new(10.0, 0.012, 0.004, 0.1).unwrap();
        let err = PmvCollection::from_index(series(vec![0.0]), limited).unwrap_err();
        assert!(matches!(err, CollectionError::MissingInput { .. }));
    }
}
