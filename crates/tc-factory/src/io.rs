//! YAML/JSON persistence for weather records and factory configs.

use crate::config::FactoryConfig;
use crate::error::FactoryResult;
use crate::weather::WeatherData;
use std::path::Path;

pub fn load_weather_yaml(path: &Path) -> FactoryResult<WeatherData> {
    let content = std::fs::read_to_string(path)?;
    let weather: WeatherData = serde_yaml::from_str(&content)?;
    weather.validate()?;
    Ok(weather)
}

pub fn load_weather_json(path: &Path) -> FactoryResult<WeatherData> {
    let content = std::fs::read_to_string(path)?;
    let weather: WeatherData = serde_json::from_str(&content)?;
    weather.validate()?;
    Ok(weather)
}

pub fn save_weather_yaml(path: &Path, weather: &WeatherData) -> FactoryResult<()> {
    weather.validate()?;
    std::fs::write(path, serde_yaml::to_string(weather)?)?;
    Ok(())
}

pub fn save_weather_json(path: &Path, weather: &WeatherData) -> FactoryResult<()> {
    weather.validate()?;
    std::fs::write(path, serde_json::to_string_pretty(weather)?)?;
    Ok(())
}

/// Loads a weather record, picking the format from the file extension.
pub fn load_weather(path: &Path) -> FactoryResult<WeatherData> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_weather_json(path),
        _ => load_weather_yaml(path),
    }
}

pub fn load_config_yaml(path: &Path) -> FactoryResult<FactoryConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: FactoryConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config_json(path: &Path) -> FactoryResult<FactoryConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: FactoryConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config_yaml(path: &Path, config: &FactoryConfig) -> FactoryResult<()> {
    config.validate()?;
    std::fs::write(path, serde_yaml::to_string(config)?)?;
    Ok(())
}

/// Loads a config, picking the format from the file extension.
pub fn load_config(path: &Path) -> FactoryResult<FactoryConfig> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_config_json(path),
        _ => load_config_yaml(path),
    }
}
