//! tc-factory: comfort collections from weather data.
//!
//! Contains:
//! - weather (WeatherSource trait, in-memory WeatherData, synthetic records)
//! - solar (sun position from site and local time)
//! - config (FactoryConfig: physiological defaults + criteria parameters)
//! - factory (outdoor MRT + per-model builders + build_collection)
//! - io (YAML/JSON load/save)

pub mod config;
pub mod error;
pub mod factory;
pub mod io;
pub mod solar;
pub mod weather;

pub use config::{
    DEFAULT_CLO, DEFAULT_EXTERNAL_WORK, DEFAULT_INDOOR_MET, DEFAULT_OUTDOOR_MET,
    DEFAULT_STILL_AIR_SPEED, DEFAULT_UTCI_CALM_WIND, FactoryConfig, PMV_WIND_SCALE,
};
pub use error::{FactoryError, FactoryResult};
pub use factory::{
    ModelRequest, adaptive_from_weather, build_collection, outdoor_mrt, pet_from_weather,
    pmv_from_weather, utci_from_weather,
};
pub use io::{
    load_config, load_config_json, load_config_yaml, load_weather, load_weather_json,
    load_weather_yaml, save_config_yaml, save_weather_json, save_weather_yaml,
};
pub use solar::SolarPosition;
pub use weather::{Location, WeatherData, WeatherSource, WeatherVariable};
