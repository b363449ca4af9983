//! SolarCal collections: mean radiant temperature of a person in the sun,
//! outdoors or behind a window, at every timestep.
//!
//! Sun positions come in as altitude and azimuth series (degrees) aligned
//! with the irradiance; computing them from a location belongs to the
//! weather side.

use crate::error::{CollectionError, CollectionResult};
use crate::input::{Input, aligned_header};
use rayon::prelude::*;
use tc_core::{TimeSeries, Timestep};
use tc_models::solarcal::sharp_from_solar_and_body_azimuth;
use tc_models::{
    IndoorHeatExchange, OutdoorHeatExchange, SkyExposure, SolarCalParameter, SolarInputs,
    indoor_sky_heat_exch, outdoor_sky_heat_exch,
};
use tracing::info;

pub const DEFAULT_WINDOW_TRANSMITTANCE: f64 = 0.4;

/// Irradiance, sun position and exposure shared by both collections.
///
/// Exposure inputs default to [`SkyExposure::default`]: fully exposed to
/// sun and sky, floor reflectance 0.25.
#[derive(Debug, Clone, Copy)]
pub struct SolarSeries<'a> {
    /// Direct normal irradiance (W/m2).
    pub direct_normal_solar: &'a TimeSeries<f64>,
    /// Diffuse horizontal irradiance (W/m2).
    pub diffuse_horizontal_solar: Input<'a>,
    /// Sun altitude (degrees); negative below the horizon.
    pub sun_altitude: Input<'a>,
    /// Sun azimuth (degrees from north); needed with a body azimuth.
    pub sun_azimuth: Option<Input<'a>>,
    pub fraction_body_exposed: Option<Input<'a>>,
    pub sky_exposure: Option<Input<'a>>,
    pub floor_reflectance: Option<Input<'a>>,
    pub body: SolarCalParameter,
    /// Direction the person faces (degrees from north). When set, each
    /// step's SHARP follows the sun instead of `body.sharp`.
    pub body_azimuth: Option<f64>,
}

impl<'a> SolarSeries<'a> {
    pub fn new(
        direct_normal_solar: &'a TimeSeries<f64>,
        diffuse_horizontal_solar: impl Into<Input<'a>>,
        sun_altitude: impl Into<Input<'a>>,
    ) -> Self {
        Self {
            direct_normal_solar,
            diffuse_horizontal_solar: diffuse_horizontal_solar.into(),
            sun_altitude: sun_altitude.into(),
            sun_azimuth: None,
            fraction_body_exposed: None,
            sky_exposure: None,
            floor_reflectance: None,
            body: SolarCalParameter::default(),
            body_azimuth: None,
        }
    }

    pub fn with_body(mut self, body: SolarCalParameter) -> Self {
        self.body = body;
        self
    }

    pub fn with_body_azimuth(
        mut self,
        body_azimuth: f64,
        sun_azimuth: impl Into<Input<'a>>,
    ) -> Self {
        self.body_azimuth = Some(body_azimuth);
        self.sun_azimuth = Some(sun_azimuth.into());
        self
    }

    pub fn with_fraction_body_exposed(mut self, fract: impl Into<Input<'a>>) -> Self {
        self.fraction_body_exposed = Some(fract.into());
        self
    }

    pub fn with_sky_exposure(mut self, sky: impl Into<Input<'a>>) -> Self {
        self.sky_exposure = Some(sky.into());
        self
    }

    pub fn with_floor_reflectance(mut self, refl: impl Into<Input<'a>>) -> Self {
        self.floor_reflectance = Some(refl.into());
        self
    }

    /// Every exposure input as a constant.
    pub fn with_exposure(self, exposure: SkyExposure) -> Self {
        self.with_fraction_body_exposed(exposure.fract_exposed)
            .with_sky_exposure(exposure.sky_exposure)
            .with_floor_reflectance(exposure.floor_reflectance)
    }

    fn inputs(&self) -> [(&'static str, Option<Input<'a>>); 6] {
        [
            ("diffuse_horizontal_solar", Some(self.diffuse_horizontal_solar)),
            ("sun_altitude", Some(self.sun_altitude)),
            ("sun_azimuth", self.sun_azimuth),
            ("fraction_body_exposed", self.fraction_body_exposed),
            ("sky_exposure", self.sky_exposure),
            ("floor_reflectance", self.floor_reflectance),
        ]
    }

    fn header(&self, others: &[(&'static str, Option<Input<'a>>)]) -> CollectionResult<Timestep> {
        if self.body_azimuth.is_some() && self.sun_azimuth.is_none() {
            return Err(CollectionError::MissingInput {
                what: "sun azimuth for a body azimuth".to_string(),
            });
        }
        let mut all = self.inputs().to_vec();
        all.extend_from_slice(others);
        aligned_header("direct_normal_solar", self.direct_normal_solar, &all)
    }

    fn step(&self, i: usize) -> (SolarInputs, SkyExposure, SolarCalParameter) {
        let defaults = SkyExposure::default();
        let at = |input: Option<Input<'_>>, default: f64| input.map_or(default, |v| v.at(i));
        let sun = SolarInputs {
            diff_horiz_solar: self.diffuse_horizontal_solar.at(i),
            dir_normal_solar: self.direct_normal_solar.values()[i],
            altitude: self.sun_altitude.at(i),
        };
        let exposure = SkyExposure {
            sky_exposure: at(self.sky_exposure, defaults.sky_exposure),
            fract_exposed: at(self.fraction_body_exposed, defaults.fract_exposed),
            floor_reflectance: at(self.floor_reflectance, defaults.floor_reflectance),
        };
        let body = match (self.body_azimuth, self.sun_azimuth) {
            (Some(body_az), Some(sun_az)) => SolarCalParameter {
                sharp: sharp_from_solar_and_body_azimuth(sun_az.at(i), body_az),
                ..self.body
            },
            _ => self.body,
        };
        (sun, exposure, body)
    }
}

fn column<R, T>(
    header: Timestep,
    rows: &[R],
    f: impl Fn(&R) -> T,
) -> CollectionResult<TimeSeries<T>> {
    Ok(TimeSeries::new(header, rows.iter().map(f).collect())?)
}

/// Outdoor MRT from surface temperatures, sky longwave and the sun.
#[derive(Debug, Clone)]
pub struct OutdoorSolarCalCollection {
    header: Timestep,
    body: SolarCalParameter,
    shortwave_erf: TimeSeries<f64>,
    shortwave_mrt_delta: TimeSeries<f64>,
    longwave_erf: TimeSeries<f64>,
    longwave_mrt_delta: TimeSeries<f64>,
    mrt_delta: TimeSeries<f64>,
    mean_radiant_temperature: TimeSeries<f64>,
}

impl OutdoorSolarCalCollection {
    /// `surface_temperatures` is the MRT of the surroundings without sun or
    /// sky (often the air temperature); `horizontal_infrared` is the
    /// downwelling longwave (W/m2).
    pub fn new<'a>(
        solar: SolarSeries<'a>,
        surface_temperatures: impl Into<Input<'a>>,
        horizontal_infrared: impl Into<Input<'a>>,
    ) -> CollectionResult<Self> {
        let srfs = surface_temperatures.into();
        let ir = horizontal_infrared.into();
        let header = solar.header(&[
            ("surface_temperatures", Some(srfs)),
            ("horizontal_infrared", Some(ir)),
        ])?;

        let rows: Vec<OutdoorHeatExchange> = (0..header.count)
            .into_par_iter()
            .map(|i| -> CollectionResult<OutdoorHeatExchange> {
                let (sun, exposure, body) = solar.step(i);
                Ok(outdoor_sky_heat_exch(srfs.at(i), ir.at(i), &sun, &exposure, &body)?)
            })
            .collect::<CollectionResult<_>>()?;

        info!(model = "SolarCal", len = header.count, "outdoor MRT collection built");
        Ok(Self {
            header,
            body: solar.body,
            shortwave_erf: column(header, &rows, |r| r.s_erf)?,
            shortwave_mrt_delta: column(header, &rows, |r| r.s_dmrt)?,
            longwave_erf: column(header, &rows, |r| r.l_erf)?,
            longwave_mrt_delta: column(header, &rows, |r| r.l_dmrt)?,
            mrt_delta: column(header, &rows, |r| r.s_dmrt + r.l_dmrt)?,
            mean_radiant_temperature: column(header, &rows, |r| r.mrt)?,
        })
    }

    pub fn header(&self) -> &Timestep {
        &self.header
    }

    pub fn body(&self) -> &SolarCalParameter {
        &self.body
    }

    pub fn shortwave_effective_radiant_field(&self) -> &TimeSeries<f64> {
        &self.shortwave_erf
    }

    pub fn shortwave_mrt_delta(&self) -> &TimeSeries<f64> {
        &self.shortwave_mrt_delta
    }

    pub fn longwave_effective_radiant_field(&self) -> &TimeSeries<f64> {
        &self.longwave_erf
    }

    /// Usually negative: the sky is colder than the surroundings.
    pub fn longwave_mrt_delta(&self) -> &TimeSeries<f64> {
        &self.longwave_mrt_delta
    }

    /// Shortwave plus longwave MRT change.
    pub fn mrt_delta(&self) -> &TimeSeries<f64> {
        &self.mrt_delta
    }

    pub fn mean_radiant_temperature(&self) -> &TimeSeries<f64> {
        &self.mean_radiant_temperature
    }

    pub fn into_mean_radiant_temperature(self) -> TimeSeries<f64> {
        self.mean_radiant_temperature
    }
}

/// Indoor MRT: a longwave MRT plus the sun through a window.
#[derive(Debug, Clone)]
pub struct IndoorSolarCalCollection {
    header: Timestep,
    body: SolarCalParameter,
    effective_radiant_field: TimeSeries<f64>,
    mrt_delta: TimeSeries<f64>,
    mean_radiant_temperature: TimeSeries<f64>,
}

impl IndoorSolarCalCollection {
    /// `window_transmittance` defaults to [`DEFAULT_WINDOW_TRANSMITTANCE`].
    pub fn new<'a>(
        solar: SolarSeries<'a>,
        longwave_mrt: impl Into<Input<'a>>,
        window_transmittance: Option<Input<'a>>,
    ) -> CollectionResult<Self> {
        let longwave = longwave_mrt.into();
        let transmittance =
            window_transmittance.unwrap_or(Input::Constant(DEFAULT_WINDOW_TRANSMITTANCE));
        let header = solar.header(&[
            ("longwave_mrt", Some(longwave)),
            ("window_transmittance", Some(transmittance)),
        ])?;

        let rows: Vec<IndoorHeatExchange> = (0..header.count)
            .into_par_iter()
            .map(|i| -> CollectionResult<IndoorHeatExchange> {
                let (sun, exposure, body) = solar.step(i);
                Ok(indoor_sky_heat_exch(
                    longwave.at(i),
                    &sun,
                    &exposure,
                    transmittance.at(i),
                    &body,
                )?)
            })
            .collect::<CollectionResult<_>>()?;

        info!(model = "SolarCal", len = header.count, "indoor MRT collection built");
        Ok(Self {
            header,
            body: solar.body,
            effective_radiant_field: column(header, &rows, |r| r.erf)?,
            mrt_delta: column(header, &rows, |r| r.dmrt)?,
            mean_radiant_temperature: column(header, &rows, |r| r.mrt)?,
        })
    }

    pub fn header(&self) -> &Timestep {
        &self.header
    }

    pub fn body(&self) -> &SolarCalParameter {
        &self.body
    }

    pub fn effective_radiant_field(&self) -> &TimeSeries<f64> {
        &self.effective_radiant_field
    }

    pub fn mrt_delta(&self) -> &TimeSeries<f64> {
        &self.mrt_delta
    }

    pub fn mean_radiant_temperature(&self) -> &TimeSeries<f64> {
        &self.mean_radiant_temperature
    }
}
