//! PET comfort collection.

use crate::error::CollectionResult;
use crate::input::{Exposure, Input, aligned_header};
use crate::summary::{ComfortSeries, percent_where};
use rayon::prelude::*;
use tc_core::units::constants::STANDARD_PRESSURE_PA;
use tc_core::units::pa;
use tc_core::{TimeSeries, Timestep};
use tc_criteria::{PetParameter, ThermalCondition};
use tc_models::adaptive::t_operative;
use tc_models::{PetResult, ThermalInputs, physiologic_equivalent_temperature};
use tc_solver::Convergence;
use tracing::{info, warn};

pub const DEFAULT_AIR_SPEED: f64 = 0.1;
/// A person walking at about 4 km/h.
pub const DEFAULT_MET_RATE: f64 = 2.4;
pub const DEFAULT_CLO_VALUE: f64 = 0.7;

/// Inputs of a [`PetCollection`]. Radiant temperature defaults to air
/// temperature, barometric pressure (Pa) to sea level.
#[derive(Debug, Clone, Copy)]
pub struct PetSeries<'a> {
    pub air_temperature: &'a TimeSeries<f64>,
    pub rel_humidity: Input<'a>,
    pub rad_temperature: Option<Input<'a>>,
    pub air_speed: Option<Input<'a>>,
    pub barometric_pressure: Option<Input<'a>>,
    pub met_rate: Option<Input<'a>>,
    pub clo_value: Option<Input<'a>>,
    pub exposure: Exposure,
}

impl<'a> PetSeries<'a> {
    pub fn new(air_temperature: &'a TimeSeries<f64>, rel_humidity: impl Into<Input<'a>>) -> Self {
        Self {
            air_temperature,
            rel_humidity: rel_humidity.into(),
            rad_temperature: None,
            air_speed: None,
            barometric_pressure: None,
            met_rate: None,
            clo_value: None,
            exposure: Exposure::default(),
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

    pub fn with_barometric_pressure(mut self, pressure: impl Into<Input<'a>>) -> Self {
        self.barometric_pressure = Some(pressure.into());
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

    pub fn with_exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    fn step(&self, i: usize) -> (ThermalInputs, f64) {
        let ta = self.air_temperature.values()[i];
        let at = |input: Option<Input<'_>>, default: f64| input.map_or(default, |v| v.at(i));
        let inputs = ThermalInputs::new(
            ta,
            at(self.rad_temperature, ta),
            at(self.air_speed, DEFAULT_AIR_SPEED),
            self.rel_humidity.at(i),
            at(self.met_rate, DEFAULT_MET_RATE),
            at(self.clo_value, DEFAULT_CLO_VALUE),
        );
        (inputs, at(self.barometric_pressure, STANDARD_PRESSURE_PA))
    }
}

struct Step {
    inputs: ThermalInputs,
    result: PetResult,
}

fn column<T>(
    header: Timestep,
    steps: &[Step],
    f: impl Fn(&Step) -> T,
) -> CollectionResult<TimeSeries<T>> {
    Ok(TimeSeries::new(header, steps.iter().map(f).collect())?)
}

#[derive(Debug, Clone)]
pub struct PetCollection {
    header: Timestep,
    parameter: PetParameter,
    exposure: Exposure,
    pet: TimeSeries<f64>,
    core_temperature: TimeSeries<f64>,
    skin_temperature: TimeSeries<f64>,
    clothing_temperature: TimeSeries<f64>,
    operative_temperature: TimeSeries<f64>,
    converged: TimeSeries<bool>,
    is_comfortable: TimeSeries<bool>,
    thermal_condition: TimeSeries<ThermalCondition>,
    category: TimeSeries<i8>,
    core_temperature_category: TimeSeries<i8>,
}

impl PetCollection {
    /// Evaluates PET at every timestep for the person of `parameter`.
    ///
    /// Steps whose body balance did not converge keep their last estimate,
    /// are flagged in [`Self::converged`] and classified as unresolved.
    pub fn new(inputs: PetSeries<'_>, parameter: PetParameter) -> CollectionResult<Self> {
        let header = aligned_header(
            "air_temperature",
            inputs.air_temperature,
            &[
                ("rel_humidity", Some(inputs.rel_humidity)),
                ("rad_temperature", inputs.rad_temperature),
                ("air_speed", inputs.air_speed),
                ("barometric_pressure", inputs.barometric_pressure),
                ("met_rate", inputs.met_rate),
                ("clo_value", inputs.clo_value),
            ],
        )?;
        let body = *parameter.body();

        let steps: Vec<Step> = (0..header.count)
            .into_par_iter()
            .map(|i| -> CollectionResult<Step> {
                let (step, pressure) = inputs.step(i);
                let result = physiologic_equivalent_temperature(&step, &body, pa(pressure))?;
                Ok(Step {
                    inputs: step,
                    result,
                })
            })
            .collect::<CollectionResult<_>>()?;

        for (i, step) in steps.iter().enumerate() {
            if let Convergence::NonConverged { iterations, stage } = step.result.convergence {
                warn!(step = i, iterations, stage, "PET body balance did not converge");
            }
        }

        let pet = column(header, &steps, |s| s.result.pet)?;
        let core_temperature = column(header, &steps, |s| s.result.t_core)?;
        let skin_temperature = column(header, &steps, |s| s.result.t_skin)?;
        let clothing_temperature = column(header, &steps, |s| s.result.t_clo)?;
        let operative_temperature =
            column(header, &steps, |s| t_operative(s.inputs.ta, s.inputs.tr))?;
        let converged = column(header, &steps, |s| s.result.convergence.is_converged())?;

        let mut is_comfortable = Vec::with_capacity(header.count);
        let mut thermal_condition = Vec::with_capacity(header.count);
        for (value, ok) in pet.values().iter().zip(converged.values()) {
            if *ok {
                is_comfortable.push(parameter.is_comfortable(*value));
                thermal_condition.push(parameter.thermal_condition(*value));
            } else {
                is_comfortable.push(false);
                thermal_condition.push(ThermalCondition::Unresolved);
            }
        }
        let category = pet.map(|v| parameter.category(*v));
        let core_temperature_category =
            core_temperature.map(|v| parameter.core_temperature_category(*v));

        let collection = Self {
            header,
            parameter,
            exposure: inputs.exposure,
            pet,
            core_temperature,
            skin_temperature,
            clothing_temperature,
            operative_temperature,
            converged,
            is_comfortable: TimeSeries::new(header, is_comfortable)?,
            thermal_condition: TimeSeries::new(header, thermal_condition)?,
            category,
            core_temperature_category,
        };
        info!(
            model = "PET",
            len = header.count,
            unresolved = collection.percent_unresolved(),
            "comfort collection built"
        );
        Ok(collection)
    }

    pub fn parameter(&self) -> &PetParameter {
        &self.parameter
    }

    pub fn physiologic_equivalent_temperature(&self) -> &TimeSeries<f64> {
        &self.pet
    }

    pub fn core_body_temperature(&self) -> &TimeSeries<f64> {
        &self.core_temperature
    }

    pub fn skin_temperature(&self) -> &TimeSeries<f64> {
        &self.skin_temperature
    }

    pub fn clothing_temperature(&self) -> &TimeSeries<f64> {
        &self.clothing_temperature
    }

    pub fn operative_temperature(&self) -> &TimeSeries<f64> {
        &self.operative_temperature
    }

    pub fn converged(&self) -> &TimeSeries<bool> {
        &self.converged
    }

    /// PET stress category, -4 to 4, on the parameter's scale.
    pub fn pet_category(&self) -> &TimeSeries<i8> {
        &self.category
    }

    /// -2 hypothermia to 2 hyperthermia.
    pub fn core_temperature_category(&self) -> &TimeSeries<i8> {
        &self.core_temperature_category
    }

    pub fn percent_hypothermia(&self) -> f64 {
        percent_where(&self.core_temperature_category, |c| *c == -2)
    }

    pub fn percent_hyperthermia(&self) -> f64 {
        percent_where(&self.core_temperature_category, |c| *c == 2)
    }
}

impl ComfortSeries for PetCollection {
    fn model(&self) -> &'static str {
        "PET"
    }

    fn header(&self) -> &Timestep {
        &self.header
    }

    fn index(&self) -> &TimeSeries<f64> {
        &self.pet
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
