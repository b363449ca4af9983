//! Comfort collections built straight from a weather source.
//!
//! Each builder pulls the variables its model needs from the source, derives
//! the exposure-dependent inputs (person-height wind, sun-corrected MRT) and
//! fills the rest from [`FactoryConfig`].

use crate::config::FactoryConfig;
use crate::error::FactoryResult;
use crate::weather::{WeatherSource, WeatherVariable};
use serde::{Deserialize, Serialize};
use tc_collection::{
    AdaptiveCollection, ComfortCollection, Exposure, Input, OutdoorSolarCalCollection,
    PetCollection, PetSeries, PmvCollection, PmvSeries, Prevailing, SolarSeries, UtciCollection,
    UtciSeries,
};
use tc_core::TimeSeries;
use tracing::{debug, info};

/// Model and exposure to build a collection for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelRequest {
    Utci { wind: bool, sun: bool },
    Pmv { wind: bool, sun: bool },
    Adaptive { wind: bool, sun: bool },
    Pet { wind: bool, sun: bool },
}

impl ModelRequest {
    pub fn exposure(&self) -> Exposure {
        let (wind, sun) = match *self {
            ModelRequest::Utci { wind, sun }
            | ModelRequest::Pmv { wind, sun }
            | ModelRequest::Adaptive { wind, sun }
            | ModelRequest::Pet { wind, sun } => (wind, sun),
        };
        Exposure { wind, sun }
    }
}

/// Mean radiant temperature of a person outdoors.
///
/// With `include_sun` this is the SolarCal MRT from horizontal infrared,
/// diffuse horizontal and direct normal irradiance at the sun position of
/// each interval's midpoint, with the config's sky exposure. Without it the
/// dry bulb temperature stands in for a fully shaded person.
pub fn outdoor_mrt<S: WeatherSource + ?Sized>(
    source: &S,
    include_sun: bool,
    config: &FactoryConfig,
) -> FactoryResult<TimeSeries<f64>> {
    let db = source.series(WeatherVariable::DryBulbTemperature)?;
    if !include_sun {
        return Ok(db);
    }
    let dir = source.series(WeatherVariable::DirectNormalRadiation)?;
    let diff = source.series(WeatherVariable::DiffuseHorizontalRadiation)?;
    let ir = source.series(WeatherVariable::HorizontalInfraredRadiation)?;
    let positions = source.solar_positions();
    let header = *db.header();
    let altitude = TimeSeries::new(header, positions.iter().map(|p| p.altitude).collect())?;
    let azimuth = TimeSeries::new(header, positions.iter().map(|p| p.azimuth).collect())?;

    let mut solar = SolarSeries::new(&dir, &diff, &altitude)
        .with_body(config.solarcal)
        .with_exposure(config.sky_exposure);
    if let Some(az) = config.body_azimuth {
        solar = solar.with_body_azimuth(az, &azimuth);
    }
    let collection = OutdoorSolarCalCollection::new(solar, &db, &ir)?;
    debug!(
        steps = header.count,
        sunlit = positions.iter().filter(|p| p.is_above_horizon()).count(),
        "outdoor mrt from solarcal"
    );
    Ok(collection.into_mean_radiant_temperature())
}

/// UTCI from weather. Excluded wind becomes the calm speed of the config.
pub fn utci_from_weather<S: WeatherSource + ?Sized>(
    source: &S,
    include_wind: bool,
    include_sun: bool,
    config: &FactoryConfig,
) -> FactoryResult<UtciCollection> {
    let ta = source.series(WeatherVariable::DryBulbTemperature)?;
    let rh = source.series(WeatherVariable::RelativeHumidity)?;
    let mrt = outdoor_mrt(source, include_sun, config)?;
    let wind = if include_wind {
        Some(source.series(WeatherVariable::WindSpeed)?)
    } else {
        None
    };
    let wind_input = wind
        .as_ref()
        .map_or(Input::Constant(config.calm_wind_speed), Input::Series);

    let inputs = UtciSeries::new(&ta, &rh)
        .with_rad_temperature(&mrt)
        .with_wind_speed(wind_input)
        .with_exposure(Exposure {
            wind: include_wind,
            sun: include_sun,
        });
    Ok(UtciCollection::new(inputs, config.utci)?)
}

/// Weather wind scaled to person height, or still air when excluded.
fn person_air_speed<S: WeatherSource + ?Sized>(
    source: &S,
    include_wind: bool,
    config: &FactoryConfig,
) -> FactoryResult<Option<TimeSeries<f64>>> {
    if !include_wind {
        return Ok(None);
    }
    let wind = source.series(WeatherVariable::WindSpeed)?;
    Ok(Some(wind.map(|v| v * config.wind_scale)))
}

/// PMV (with SET) of an outdoor person from weather.
///
/// Metabolic rate, clothing and external work come from the config, which
/// defaults to a person walking outdoors.
pub fn pmv_from_weather<S: WeatherSource + ?Sized>(
    source: &S,
    include_wind: bool,
    include_sun: bool,
    config: &FactoryConfig,
) -> FactoryResult<PmvCollection> {
    let ta = source.series(WeatherVariable::DryBulbTemperature)?;
    let rh = source.series(WeatherVariable::RelativeHumidity)?;
    let mrt = outdoor_mrt(source, include_sun, config)?;
    let vel = person_air_speed(source, include_wind, config)?;
    let vel_input = vel
        .as_ref()
        .map_or(Input::Constant(config.still_air_speed), Input::Series);

    let inputs = PmvSeries::new(&ta, &rh)
        .with_rad_temperature(&mrt)
        .with_air_speed(vel_input)
        .with_met_rate(config.met_rate)
        .with_clo_value(config.clo_value)
        .with_external_work(config.external_work)
        .with_set_config(config.set)
        .with_exposure(Exposure {
            wind: include_wind,
            sun: include_sun,
        });
    Ok(PmvCollection::new(inputs, config.pmv)?)
}

/// Adaptive comfort from weather.
///
/// The prevailing temperature is reduced from the dry bulb series with the
/// parameter's method; operative temperature combines dry bulb and MRT.
pub fn adaptive_from_weather<S: WeatherSource + ?Sized>(
    source: &S,
    include_wind: bool,
    include_sun: bool,
    config: &FactoryConfig,
) -> FactoryResult<AdaptiveCollection> {
    let ta = source.series(WeatherVariable::DryBulbTemperature)?;
    let mrt = outdoor_mrt(source, include_sun, config)?;
    let vel = person_air_speed(source, include_wind, config)?;
    let vel_input = vel
        .as_ref()
        .map_or(Input::Constant(config.still_air_speed), Input::Series);

    let collection = AdaptiveCollection::from_air_and_rad_temp(
        Prevailing::Outdoor(&ta),
        &ta,
        Some(&mrt),
        Some(vel_input),
        config.adaptive,
    )?;
    Ok(collection.with_exposure(Exposure {
        wind: include_wind,
        sun: include_sun,
    }))
}

/// PET of an outdoor person from weather.
///
/// Metabolic rate and clothing come from the config, the body from
/// `config.pet`. Station pressure is read when the source has it; otherwise
/// the standard atmosphere at the site elevation is used.
pub fn pet_from_weather<S: WeatherSource + ?Sized>(
    source: &S,
    include_wind: bool,
    include_sun: bool,
    config: &FactoryConfig,
) -> FactoryResult<PetCollection> {
    let ta = source.series(WeatherVariable::DryBulbTemperature)?;
    let rh = source.series(WeatherVariable::RelativeHumidity)?;
    let mrt = outdoor_mrt(source, include_sun, config)?;
    let vel = person_air_speed(source, include_wind, config)?;
    let vel_input = vel
        .as_ref()
        .map_or(Input::Constant(config.still_air_speed), Input::Series);
    let station = WeatherVariable::AtmosphericStationPressure;
    let pressure = source
        .variable(station)
        .is_some()
        .then(|| source.series(station))
        .transpose()?;
    let pressure_input = pressure.as_ref().map_or(
        Input::Constant(source.location().standard_pressure()),
        Input::Series,
    );

    let inputs = PetSeries::new(&ta, &rh)
        .with_rad_temperature(&mrt)
        .with_air_speed(vel_input)
        .with_barometric_pressure(pressure_input)
        .with_met_rate(config.met_rate)
        .with_clo_value(config.clo_value)
        .with_exposure(Exposure {
            wind: include_wind,
            sun: include_sun,
        });
    Ok(PetCollection::new(inputs, config.pet)?)
}

/// Builds the collection named by `request`.
pub fn build_collection<S: WeatherSource + ?Sized>(
    source: &S,
    request: &ModelRequest,
    config: &FactoryConfig,
) -> FactoryResult<ComfortCollection> {
    info!(
        location = source.location().name.as_str(),
        steps = source.timestep().count,
        ?request,
        "building comfort collection from weather"
    );
    let collection: ComfortCollection = match *request {
        ModelRequest::Utci { wind, sun } => utci_from_weather(source, wind, sun, config)?.into(),
        ModelRequest::Pmv { wind, sun } => pmv_from_weather(source, wind, sun, config)?.into(),
        ModelRequest::Adaptive { wind, sun } => {
            adaptive_from_weather(source, wind, sun, config)?.into()
        }
        ModelRequest::Pet { wind, sun } => pet_from_weather(source, wind, sun, config)?.into(),
    };
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FactoryError;
    use crate::weather::{Location, WeatherData};
    use chrono::NaiveDate;
    use tc_collection::ComfortSeries;
    use tc_core::Timestep;

    fn site() -> Location {
        Location {
            name: "test site".to_string(),
            latitude: 40.0,
            longitude: -75.0,
            time_zone: -5.0,
            elevation: 10.0,
        }
    }

    fn summer(days: usize) -> WeatherData {
        let start = NaiveDate::from_ymd_opt(2023, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        WeatherData::synthetic(site(), start, days, 14.0, 12.0).unwrap()
    }

    #[test]
    fn shade_mrt_is_dry_bulb() {
        let data = summer(1);
        let mrt = outdoor_mrt(&data, false, &FactoryConfig::default()).unwrap();
        assert_eq!(
            mrt.values(),
            data.variable(WeatherVariable::DryBulbTemperature).unwrap()
        );
    }

    #[test]
    fn sun_raises_midday_mrt_and_sky_cools_night() {
        let data = summer(1);
        let db = data.variable(WeatherVariable::DryBulbTemperature).unwrap();
        let mrt = outdoor_mrt(&data, true, &FactoryConfig::default()).unwrap();
        assert!(mrt.values()[12] > db[12] + 10.0);
        assert!(mrt.values()[2] < db[2]);
    }

    #[test]
    fn body_azimuth_changes_sunlit_mrt() {
        let data = summer(1);
        let facing_sun = FactoryConfig {
            body_azimuth: Some(180.0),
            ..FactoryConfig::default()
        };
        let back_to_sun = FactoryConfig {
            body_azimuth: Some(0.0),
            ..FactoryConfig::default()
        };
        let a = outdoor_mrt(&data, true, &facing_sun).unwrap();
        let b = outdoor_mrt(&data, true, &back_to_sun).unwrap();
        assert_ne!(a.values()[12], b.values()[12]);
        assert_eq!(a.values()[2], b.values()[2]);
    }

    #[test]
    fn missing_radiation_fails_only_with_sun() {
        let mut data = summer(1);
        data.variables
            .remove(&WeatherVariable::DirectNormalRadiation);
        let cfg = FactoryConfig::default();
        assert!(utci_from_weather(&data, true, false, &cfg).is_ok());
        match utci_from_weather(&data, true, true, &cfg) {
            Err(FactoryError::MissingInput { what }) => {
                assert_eq!(what, "direct_normal_radiation")
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn missing_wind_is_fine_when_excluded() {
        let mut data = summer(1);
        data.variables.remove(&WeatherVariable::WindSpeed);
        let cfg = FactoryConfig::default();
        let coll = pmv_from_weather(&data, false, false, &cfg).unwrap();
        assert_eq!(coll.len(), 24);
        assert!(matches!(
            pmv_from_weather(&data, true, false, &cfg),
            Err(FactoryError::MissingInput { .. })
        ));
    }

    #[test]
    fn exposure_is_recorded() {
        let data = summer(1);
        let cfg = FactoryConfig::default();
        let request = ModelRequest::Utci {
            wind: false,
            sun: true,
        };
        let coll = build_collection(&data, &request, &cfg).unwrap();
        assert_eq!(coll.exposure(), request.exposure());
        assert_eq!(coll.model(), "UTCI");
    }

    #[test]
    fn utci_shelter_from_wind_uses_calm_speed() {
        let data = summer(1);
        let cfg = FactoryConfig::default();
        let sheltered = utci_from_weather(&data, false, false, &cfg).unwrap();
        let direct = tc_models::universal_thermal_climate_index(
            data.variable(WeatherVariable::DryBulbTemperature).unwrap()[0],
            data.variable(WeatherVariable::DryBulbTemperature).unwrap()[0],
            cfg.calm_wind_speed,
            data.variable(WeatherVariable::RelativeHumidity).unwrap()[0],
        );
        assert!((sheltered.index().values()[0] - direct).abs() < 1e-9);
    }

    #[test]
    fn empty_source_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2023, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let data = WeatherData::new(site(), Timestep::hourly(start, 0))
            .with(WeatherVariable::DryBulbTemperature, vec![])
            .unwrap()
            .with(WeatherVariable::RelativeHumidity, vec![])
            .unwrap();
        let err = utci_from_weather(&data, false, false, &FactoryConfig::default()).unwrap_err();
        assert!(matches!(err, FactoryError::Collection(_)));
    }

    #[test]
    fn pet_without_exposure_matches_point_model() {
        let data = summer(1);
        let cfg = FactoryConfig::default();
        let coll = pet_from_weather(&data, false, false, &cfg).unwrap();
        assert_eq!(coll.len(), 24);
        let ta = data.variable(WeatherVariable::DryBulbTemperature).unwrap()[0];
        let rh = data.variable(WeatherVariable::RelativeHumidity).unwrap()[0];
        let inputs = tc_models::ThermalInputs::new(
            ta,
            ta,
            cfg.still_air_speed,
            rh,
            cfg.met_rate,
            cfg.clo_value,
        );
        let point = tc_models::physiologic_equivalent_temperature(
            &inputs,
            cfg.pet.body(),
            tc_core::units::pa(site().standard_pressure()),
        )
        .unwrap();
        assert_eq!(coll.physiologic_equivalent_temperature().values()[0], point.pet);
    }

    #[test]
    fn pet_reads_station_pressure_when_present() {
        let data = summer(1);
        let cfg = FactoryConfig::default();
        let request = ModelRequest::Pet {
            wind: true,
            sun: false,
        };
        let derived = build_collection(&data, &request, &cfg).unwrap();
        assert_eq!(derived.model(), "PET");
        assert_eq!(derived.exposure(), request.exposure());

        let same = data
            .clone()
            .with(
                WeatherVariable::AtmosphericStationPressure,
                vec![site().standard_pressure(); 24],
            )
            .unwrap();
        let read = build_collection(&same, &request, &cfg).unwrap();
        assert_eq!(read.index().values(), derived.index().values());
    }

    #[test]
    fn pet_sun_warms_midday() {
        let data = summer(1);
        let cfg = FactoryConfig::default();
        let shade = pet_from_weather(&data, false, false, &cfg).unwrap();
        let sun = pet_from_weather(&data, false, true, &cfg).unwrap();
        let noon = 12;
        assert!(
            sun.physiologic_equivalent_temperature().values()[noon]
                > shade.physiologic_equivalent_temperature().values()[noon]
        );
    }

    #[test]
    fn request_reads_from_yaml() {
        let req: ModelRequest = serde_yaml::from_str("model: pmv\nwind: true\nsun: false\n").unwrap();
        assert_eq!(
            req,
            ModelRequest::Pmv {
                wind: true,
                sun: false
            }
        );
        let req: ModelRequest = serde_yaml::from_str("model: pet\nwind: false\nsun: true\n").unwrap();
        assert_eq!(
            req,
            ModelRequest::Pet {
                wind: false,
                sun: true
            }
        );
    }
}
