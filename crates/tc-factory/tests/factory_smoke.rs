use chrono::NaiveDate;
use tc_collection::{ComfortCollection, ComfortSeries};
use tc_criteria::{AdaptiveParameter, ThermalCondition};
use tc_factory::{
    FactoryConfig, Location, ModelRequest, WeatherData, WeatherSource, WeatherVariable,
    build_collection, load_config, load_weather, save_config_yaml, save_weather_json,
    save_weather_yaml,
};
use tc_models::AdaptiveStandard;

fn philadelphia_week(days: usize) -> WeatherData {
    let start = NaiveDate::from_ymd_opt(2023, 7, 10)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let site = Location {
        name: "Philadelphia".to_string(),
        latitude: 39.9,
        longitude: -75.2,
        time_zone: -5.0,
        elevation: 9.0,
    };
    WeatherData::synthetic(site, start, days, 13.0, 12.0).unwrap()
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("tc_factory_{}_{name}", std::process::id()))
}

#[test]
fn weather_file_round_trip_in_both_formats() {
    let data = philadelphia_week(1);

    let yaml = temp_path("weather.yaml");
    save_weather_yaml(&yaml, &data).unwrap();
    assert_eq!(load_weather(&yaml).unwrap(), data);

    let json = temp_path("weather.json");
    save_weather_json(&json, &data).unwrap();
    let back = load_weather(&json).unwrap();
    assert_eq!(back.timestep(), data.timestep());
    assert_eq!(back.location().name, "Philadelphia");

    let _ = std::fs::remove_file(yaml);
    let _ = std::fs::remove_file(json);
}

#[test]
fn malformed_weather_file_is_rejected() {
    let path = temp_path("short.yaml");
    std::fs::write(
        &path,
        "timestep:\n  start: 2023-07-10T00:00:00\n  interval_minutes: 60\n  count: 3\n\
         variables:\n  dry_bulb_temperature: [20.0, 21.0]\n",
    )
    .unwrap();
    assert!(load_weather(&path).is_err());
    let _ = std::fs::remove_file(path);
}

#[test]
fn config_round_trip_keeps_parameters() {
    let mut config = FactoryConfig {
        clo_value: 0.5,
        body_azimuth: Some(90.0),
        ..FactoryConfig::default()
    };
    config.adaptive = AdaptiveParameter::for_standard(AdaptiveStandard::En15251);
    let path = temp_path("config.yaml");
    save_config_yaml(&path, &config).unwrap();
    assert_eq!(load_config(&path).unwrap(), config);
    let _ = std::fs::remove_file(path);
}

#[test]
fn every_model_builds_from_one_week() {
    let data = philadelphia_week(8);
    let mut config = FactoryConfig::default();
    config.adaptive = AdaptiveParameter::for_standard(AdaptiveStandard::En15251);

    for request in [
        ModelRequest::Utci {
            wind: true,
            sun: true,
        },
        ModelRequest::Pmv {
            wind: true,
            sun: false,
        },
        ModelRequest::Adaptive {
            wind: false,
            sun: true,
        },
        ModelRequest::Pet {
            wind: true,
            sun: true,
        },
    ] {
        let coll = build_collection(&data, &request, &config).unwrap();
        assert_eq!(coll.len(), 8 * 24);
        assert_eq!(coll.exposure(), request.exposure());
        let summary = coll.summary();
        let total = summary.percent_neutral
            + summary.percent_hot
            + summary.percent_cold
            + summary.percent_unresolved;
        assert!((total - 100.0).abs() < 1e-9, "{request:?}: {total}");
    }
}

#[test]
fn sun_makes_summer_afternoons_hotter() {
    let data = philadelphia_week(2);
    let config = FactoryConfig::default();
    let shade = build_collection(
        &data,
        &ModelRequest::Utci {
            wind: true,
            sun: false,
        },
        &config,
    )
    .unwrap();
    let sun = build_collection(
        &data,
        &ModelRequest::Utci {
            wind: true,
            sun: true,
        },
        &config,
    )
    .unwrap();
    // 13:00 local on the first day.
    assert!(sun.index().values()[13] > shade.index().values()[13] + 3.0);
    assert!(matches!(sun, ComfortCollection::Utci(_)));
    assert_eq!(
        sun.thermal_condition().values()[13],
        ThermalCondition::Hot
    );
}

#[test]
fn missing_humidity_fails_pmv() {
    let mut data = philadelphia_week(1);
    data.variables.remove(&WeatherVariable::RelativeHumidity);
    let err = build_collection(
        &data,
        &ModelRequest::Pmv {
            wind: false,
            sun: false,
        },
        &FactoryConfig::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("relative_humidity"));
}
