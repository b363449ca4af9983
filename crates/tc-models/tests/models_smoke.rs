//! Integration tests across tc-models: inverse solves and model coupling.

use tc_models::adaptive::neutral_temperature_conditioned;
use tc_models::{
    AdaptiveStandard, PartialThermalInputs, PartialUtciInputs, Posture, SkyExposure,
    SolarCalParameter, SolarInputs, ThermalInputs, calc_missing_pmv_input,
    calc_missing_utci_input, outdoor_sky_heat_exch, predicted_mean_vote,
    universal_thermal_climate_index,
};
use tc_models::set::SetConfig;
use tc_solver::RootConfig;

#[test]
fn utci_inverse_air_temperature() {
    let partial = PartialUtciInputs {
        ta: None,
        tr: Some(20.0),
        vel: Some(0.5),
        rh: Some(50.0),
    };
    let solved = calc_missing_utci_input(25.0, &partial, &RootConfig::default()).unwrap();
    assert!((solved.ta - 26.9827).abs() < 0.05, "ta = {}", solved.ta);
    let check = universal_thermal_climate_index(solved.ta, solved.tr, solved.vel, solved.rh);
    assert!((check - 25.0).abs() < 0.01);
}

#[test]
fn utci_inverse_rejects_ambiguous_inputs() {
    let partial = PartialUtciInputs {
        ta: None,
        tr: Some(20.0),
        vel: None,
        rh: Some(50.0),
    };
    assert!(calc_missing_utci_input(25.0, &partial, &RootConfig::default()).is_err());
}

#[test]
fn pmv_inverse_air_temperature() {
    let partial = PartialThermalInputs {
        ta: None,
        tr: Some(20.0),
        vel: Some(0.05),
        rh: Some(50.0),
        met: Some(1.2),
        clo: Some(0.75),
        wme: Some(0.0),
    };
    let solved = calc_missing_pmv_input(-0.5, &partial, &RootConfig::default(), 0.1).unwrap();
    assert!((solved.ta - 21.8479).abs() < 0.05, "ta = {}", solved.ta);
    let r = predicted_mean_vote(&solved, 0.1, &SetConfig::default());
    assert!((r.pmv + 0.5).abs() < 0.01);
}

#[test]
fn elevated_air_speed_cools_through_set() {
    let still = predicted_mean_vote(
        &ThermalInputs::new(28.0, 28.0, 0.1, 50.0, 1.1, 0.5),
        0.1,
        &SetConfig::default(),
    );
    let breezy = predicted_mean_vote(
        &ThermalInputs::new(28.0, 28.0, 0.8, 50.0, 1.1, 0.5),
        0.1,
        &SetConfig::default(),
    );
    assert_eq!(still.cooling_effect, 0.0);
    assert!(breezy.cooling_effect > 0.0);
    assert!(breezy.pmv < still.pmv);
    assert!(breezy.ta_adj < 28.0);
}

#[test]
fn sun_raises_mrt_above_surroundings() {
    let sun = SolarInputs {
        diff_horiz_solar: 150.0,
        dir_normal_solar: 600.0,
        altitude: 50.0,
    };
    let body = SolarCalParameter::new(Posture::Seated, 90.0, 0.7, 0.95).unwrap();
    let r = outdoor_sky_heat_exch(25.0, 400.0, &sun, &SkyExposure::default(), &body).unwrap();
    assert!(r.s_dmrt > 0.0);
    assert!(r.mrt > 25.0 + r.l_dmrt);
}

#[test]
fn conditioning_flattens_neutral_line() {
    let free = neutral_temperature_conditioned(30.0, 0.0, AdaptiveStandard::Ashrae55)
        - neutral_temperature_conditioned(10.0, 0.0, AdaptiveStandard::Ashrae55);
    let mixed = neutral_temperature_conditioned(30.0, 0.5, AdaptiveStandard::Ashrae55)
        - neutral_temperature_conditioned(10.0, 0.5, AdaptiveStandard::Ashrae55);
    assert!(mixed < free);
}
