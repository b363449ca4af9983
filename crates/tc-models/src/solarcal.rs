//! SolarCal: mean radiant temperature correction for sun exposure.
//!
//! Converts direct, diffuse and ground-reflected shortwave flux on a human
//! body into an effective radiant field (ERF) and the equivalent change in
//! mean radiant temperature. Outdoors, longwave exchange with the sky is
//! added from the horizontal infrared radiation.
//!
//! Out-of-range policy: a negative solar altitude means no shortwave gain.
//! Altitudes outside [0, 90] or body-relative azimuths outside [0, 180] are
//! rejected by the projection factor lookup.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use tc_core::numeric::ZERO_CELSIUS_K;
use tc_core::units::constants::STEFAN_BOLTZMANN;

/// Radiative heat transfer coefficient of the body (W/m2K).
pub const RAD_TRANS_COEFF: f64 = 6.012;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    Standing,
    Seated,
    Supine,
}

impl Posture {
    /// Fraction of the body surface that exchanges radiation.
    pub fn fract_efficiency(&self) -> f64 {
        match self {
            Posture::Seated => 0.696,
            Posture::Standing | Posture::Supine => 0.725,
        }
    }
}

/// Body parameters of a SolarCal evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarCalParameter {
    pub posture: Posture,
    /// Solar horizontal angle relative to the front of the person (0-180).
    pub sharp: f64,
    pub body_absorptivity: f64,
    pub body_emissivity: f64,
}

impl Default for SolarCalParameter {
    fn default() -> Self {
        Self {
            posture: Posture::Standing,
            sharp: 135.0,
            body_absorptivity: 0.7,
            body_emissivity: 0.95,
        }
    }
}

impl SolarCalParameter {
    pub fn new(
        posture: Posture,
        sharp: f64,
        body_absorptivity: f64,
        body_emissivity: f64,
    ) -> ModelResult<Self> {
        if !(0.0..=180.0).contains(&sharp) {
            return Err(ModelError::OutOfRange {
                what: "sharp must be between 0 and 180",
                value: sharp,
            });
        }
        if !(0.0..=1.0).contains(&body_absorptivity) {
            return Err(ModelError::OutOfRange {
                what: "body_absorptivity must be between 0 and 1",
                value: body_absorptivity,
            });
        }
        if !(body_emissivity > 0.0 && body_emissivity <= 1.0) {
            return Err(ModelError::OutOfRange {
                what: "body_emissivity must be in (0, 1]",
                value: body_emissivity,
            });
        }
        Ok(Self {
            posture,
            sharp,
            body_absorptivity,
            body_emissivity,
        })
    }
}

/// Site exposure of the person.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyExposure {
    /// Fraction of the sky vault visible to the person (0-1).
    pub sky_exposure: f64,
    /// Fraction of the body exposed to direct sun (0-1).
    pub fract_exposed: f64,
    pub floor_reflectance: f64,
}

impl Default for SkyExposure {
    fn default() -> Self {
        Self {
            sky_exposure: 1.0,
            fract_exposed: 1.0,
            floor_reflectance: 0.25,
        }
    }
}

/// Outdoor shortwave and longwave MRT correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutdoorHeatExchange {
    pub s_erf: f64,
    pub s_dmrt: f64,
    pub l_erf: f64,
    pub l_dmrt: f64,
    pub mrt: f64,
}

/// Indoor shortwave MRT correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndoorHeatExchange {
    pub erf: f64,
    pub dmrt: f64,
    pub mrt: f64,
}

/// Solar geometry and irradiance at one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarInputs {
    pub diff_horiz_solar: f64,
    pub dir_normal_solar: f64,
    /// Solar altitude (degrees).
    pub altitude: f64,
}

/// MRT of an outdoor person from surrounding surface temperature, sky
/// longwave and sun.
pub fn outdoor_sky_heat_exch(
    srfs_temp: f64,
    horiz_ir: f64,
    sun: &SolarInputs,
    exposure: &SkyExposure,
    body: &SolarCalParameter,
) -> ModelResult<OutdoorHeatExchange> {
    let fract_eff = body.posture.fract_efficiency();
    let (s_erf, s_dmrt) = if sun.altitude >= 0.0 {
        let flux = body_solar_flux_from_parts(sun, exposure, body)?;
        let erf = erf_from_body_solar_flux(flux, body);
        (erf, mrt_delta_from_erf(erf, fract_eff))
    } else {
        (0.0, 0.0)
    };

    let sky_temp = sky_temperature(horiz_ir, body.body_emissivity);
    let l_dmrt = 0.5 * exposure.sky_exposure * (sky_temp - srfs_temp);
    let l_erf = erf_from_mrt_delta(l_dmrt, fract_eff);

    Ok(OutdoorHeatExchange {
        s_erf,
        s_dmrt,
        l_erf,
        l_dmrt,
        mrt: srfs_temp + s_dmrt + l_dmrt,
    })
}

/// MRT of an indoor person receiving sun through a window.
pub fn indoor_sky_heat_exch(
    longwave_mrt: f64,
    sun: &SolarInputs,
    exposure: &SkyExposure,
    window_transmittance: f64,
    body: &SolarCalParameter,
) -> ModelResult<IndoorHeatExchange> {
    let (erf, dmrt) = if sun.altitude >= 0.0 {
        let flux = body_solar_flux_from_parts(sun, exposure, body)? * window_transmittance;
        let erf = erf_from_body_solar_flux(flux, body);
        (erf, mrt_delta_from_erf(erf, body.posture.fract_efficiency()))
    } else {
        (0.0, 0.0)
    };
    Ok(IndoorHeatExchange {
        erf,
        dmrt,
        mrt: longwave_mrt + dmrt,
    })
}

/// Effective sky temperature (C) from horizontal infrared (W/m2).
pub fn sky_temperature(horiz_ir: f64, emissivity: f64) -> f64 {
    (horiz_ir / (emissivity * STEFAN_BOLTZMANN)).powf(0.25) - ZERO_CELSIUS_K
}

pub fn mrt_delta_from_erf(erf: f64, fract_efficiency: f64) -> f64 {
    erf / (fract_efficiency * RAD_TRANS_COEFF)
}

pub fn erf_from_mrt_delta(mrt_delta: f64, fract_efficiency: f64) -> f64 {
    mrt_delta * fract_efficiency * RAD_TRANS_COEFF
}

fn erf_from_body_solar_flux(flux: f64, body: &SolarCalParameter) -> f64 {
    flux * (body.body_absorptivity / body.body_emissivity)
}

/// Total solar flux on the body: direct, sky diffuse and ground reflected.
pub fn body_solar_flux_from_parts(
    sun: &SolarInputs,
    exposure: &SkyExposure,
    body: &SolarCalParameter,
) -> ModelResult<f64> {
    let fract_eff = body.posture.fract_efficiency();
    let glob_horiz =
        sun.diff_horiz_solar + sun.dir_normal_solar * sun.altitude.to_radians().sin();
    let proj = projection_factor(sun.altitude, body.sharp, body.posture)?;

    let direct = proj * exposure.fract_exposed * sun.dir_normal_solar;
    let diffuse = 0.5 * exposure.sky_exposure * fract_eff * sun.diff_horiz_solar;
    let reflected =
        0.5 * exposure.sky_exposure * fract_eff * glob_horiz * exposure.floor_reflectance;
    Ok(direct + diffuse + reflected)
}

/// Angle between the sun and the direction the person faces (0-180).
pub fn sharp_from_solar_and_body_azimuth(solar_azimuth: f64, body_azimuth: f64) -> f64 {
    let diff = (solar_azimuth - body_azimuth).abs();
    if diff <= 180.0 { diff } else { 360.0 - diff }
}

const ALT_RANGE: [f64; 7] = [0.0, 15.0, 30.0, 45.0, 60.0, 75.0, 90.0];
const AZ_RANGE: [f64; 13] = [
    0.0, 15.0, 30.0, 45.0, 60.0, 75.0, 90.0, 105.0, 120.0, 135.0, 150.0, 165.0, 180.0,
];

/// Projected area factor, rows by azimuth and columns by altitude.
#[rustfmt::skip]
const STANDING_AP: [[f64; 7]; 13] = [
    [0.254, 0.254, 0.228, 0.187, 0.149, 0.104, 0.059],
    [0.248, 0.248, 0.225, 0.183, 0.145, 0.102, 0.059],
    [0.239, 0.239, 0.218, 0.177, 0.138, 0.096, 0.059],
    [0.225, 0.225, 0.199, 0.165, 0.127, 0.09, 0.059],
    [0.205, 0.205, 0.182, 0.151, 0.116, 0.083, 0.059],
    [0.183, 0.183, 0.165, 0.136, 0.109, 0.078, 0.059],
    [0.167, 0.167, 0.155, 0.131, 0.107, 0.078, 0.059],
    [0.175, 0.175, 0.161, 0.131, 0.111, 0.081, 0.059],
    [0.199, 0.199, 0.178, 0.147, 0.12, 0.084, 0.059],
    [0.22, 0.22, 0.196, 0.16, 0.126, 0.088, 0.059],
    [0.238, 0.238, 0.21, 0.17, 0.133, 0.091, 0.059],
    [0.249, 0.249, 0.22, 0.177, 0.138, 0.093, 0.059],
    [0.252, 0.252, 0.223, 0.178, 0.138, 0.093, 0.059],
];

#[rustfmt::skip]
const SEATED_AP: [[f64; 7]; 13] = [
    [0.202, 0.226, 0.212, 0.211, 0.182, 0.156, 0.123],
    [0.203, 0.228, 0.205, 0.2, 0.187, 0.158, 0.123],
    [0.2, 0.231, 0.207, 0.202, 0.184, 0.155, 0.123],
    [0.191, 0.227, 0.205, 0.201, 0.175, 0.149, 0.123],
    [0.177, 0.214, 0.195, 0.192, 0.168, 0.141, 0.123],
    [0.16, 0.196, 0.182, 0.181, 0.162, 0.134, 0.123],
    [0.15, 0.181, 0.173, 0.17, 0.153, 0.129, 0.123],
    [0.163, 0.18, 0.164, 0.158, 0.145, 0.125, 0.123],
    [0.182, 0.181, 0.156, 0.145, 0.136, 0.122, 0.123],
    [0.195, 0.181, 0.146, 0.134, 0.128, 0.118, 0.123],
    [0.207, 0.178, 0.135, 0.121, 0.117, 0.117, 0.123],
    [0.213, 0.174, 0.125, 0.109, 0.109, 0.116, 0.123],
    [0.209, 0.167, 0.117, 0.106, 0.106, 0.114, 0.123],
];

fn find_span(range: &[f64], x: f64, what: &'static str) -> ModelResult<usize> {
    range
        .windows(2)
        .position(|w| x >= w[0] && x <= w[1])
        .ok_or(ModelError::OutOfRange { what, value: x })
}

/// Fraction of body area exposed to direct sun, by bilinear interpolation.
///
/// A supine body is mapped onto the standing table by swapping altitude
/// and azimuth.
pub fn projection_factor(altitude: f64, sharp: f64, posture: Posture) -> ModelResult<f64> {
    let (altitude, sharp, table) = match posture {
        Posture::Standing => (altitude, sharp, &STANDING_AP),
        Posture::Seated => (altitude, sharp, &SEATED_AP),
        Posture::Supine => ((90.0 - sharp).abs(), altitude, &STANDING_AP),
    };

    let alt_i = find_span(&ALT_RANGE, altitude, "solar altitude")?;
    let az_i = find_span(&AZ_RANGE, sharp, "sharp")?;
    let (alt1, alt2) = (ALT_RANGE[alt_i], ALT_RANGE[alt_i + 1]);
    let (az1, az2) = (AZ_RANGE[az_i], AZ_RANGE[az_i + 1]);

    let ap11 = table[az_i][alt_i];
    let ap12 = table[az_i][alt_i + 1];
    let ap21 = table[az_i + 1][alt_i];
    let ap22 = table[az_i + 1][alt_i + 1];

    let ap = ap11 * (az2 - sharp) * (alt2 - altitude)
        + ap21 * (sharp - az1) * (alt2 - altitude)
        + ap12 * (az2 - sharp) * (altitude - alt1)
        + ap22 * (sharp - az1) * (altitude - alt1);
    Ok(ap / ((az2 - az1) * (alt2 - alt1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun(diff: f64, dir: f64, alt: f64) -> SolarInputs {
        SolarInputs {
            diff_horiz_solar: diff,
            dir_normal_solar: dir,
            altitude: alt,
        }
    }

    #[test]
    fn projection_factor_at_grid_points() {
        assert_eq!(projection_factor(45.0, 135.0, Posture::Standing).unwrap(), 0.16);
        assert_eq!(projection_factor(0.0, 0.0, Posture::Seated).unwrap(), 0.202);
        assert_eq!(projection_factor(90.0, 180.0, Posture::Standing).unwrap(), 0.059);
    }

    #[test]
    fn projection_factor_interpolates() {
        let mid = projection_factor(52.5, 142.5, Posture::Standing).unwrap();
        let expected = (0.16 + 0.126 + 0.17 + 0.133) / 4.0;
        assert!((mid - expected).abs() < 1e-12);
    }

    #[test]
    fn projection_factor_rejects_out_of_table() {
        assert!(projection_factor(-5.0, 90.0, Posture::Standing).is_err());
        assert!(projection_factor(45.0, 200.0, Posture::Seated).is_err());
    }

    #[test]
    fn supine_transposes_onto_standing() {
        let supine = projection_factor(30.0, 60.0, Posture::Supine).unwrap();
        let standing = projection_factor(30.0, 30.0, Posture::Standing).unwrap();
        assert_eq!(supine, standing);
    }

    #[test]
    fn outdoor_night_only_longwave() {
        let r = outdoor_sky_heat_exch(
            18.0,
            330.0,
            &sun(0.0, 0.0, -10.0),
            &SkyExposure::default(),
            &SolarCalParameter::default(),
        )
        .unwrap();
        assert_eq!(r.s_erf, 0.0);
        assert_eq!(r.s_dmrt, 0.0);
        assert!((r.l_erf - -24.792).abs() < 0.25);
        assert!((r.l_dmrt - -5.688).abs() < 0.06);
        assert!((r.mrt - 12.312).abs() < 0.06);
    }

    #[test]
    fn outdoor_daytime() {
        let r = outdoor_sky_heat_exch(
            22.0,
            380.0,
            &sun(200.0, 380.0, 45.0),
            &SkyExposure::default(),
            &SolarCalParameter::default(),
        )
        .unwrap();
        // Direct 0.16 * 380, diffuse 0.5 * 0.725 * 200, reflected from the global sum.
        let glob = 200.0 + 380.0 * 45f64.to_radians().sin();
        let flux = 0.16 * 380.0 + 0.3625 * 200.0 + 0.3625 * glob * 0.25;
        let erf = flux * 0.7 / 0.95;
        assert!((r.s_erf - erf).abs() < 1e-9);
        assert!((r.l_dmrt - -2.6661).abs() < 0.03);
        assert!((r.mrt - (22.0 + r.s_dmrt + r.l_dmrt)).abs() < 1e-12);
        assert!(r.s_dmrt > 25.0 && r.s_dmrt < 35.0);
    }

    #[test]
    fn indoor_applies_window_transmittance() {
        let body = SolarCalParameter {
            posture: Posture::Seated,
            ..SolarCalParameter::default()
        };
        let exposure = SkyExposure {
            sky_exposure: 0.5,
            fract_exposed: 0.5,
            ..SkyExposure::default()
        };
        let open = indoor_sky_heat_exch(22.0, &sun(200.0, 380.0, 45.0), &exposure, 1.0, &body)
            .unwrap();
        let glazed = indoor_sky_heat_exch(22.0, &sun(200.0, 380.0, 45.0), &exposure, 0.4, &body)
            .unwrap();
        assert!((glazed.erf - 0.4 * open.erf).abs() < 1e-9);
        let dark = indoor_sky_heat_exch(22.0, &sun(0.0, 0.0, 0.0), &exposure, 0.4, &body).unwrap();
        assert_eq!(dark.mrt, 22.0);
    }

    #[test]
    fn sharp_wraps_around() {
        assert_eq!(sharp_from_solar_and_body_azimuth(350.0, 10.0), 20.0);
        assert_eq!(sharp_from_solar_and_body_azimuth(90.0, 0.0), 90.0);
    }

    #[test]
    fn parameter_validation() {
        assert!(SolarCalParameter::new(Posture::Seated, 200.0, 0.7, 0.95).is_err());
        assert!(SolarCalParameter::new(Posture::Seated, 90.0, 1.2, 0.95).is_err());
        assert!(SolarCalParameter::new(Posture::Seated, 90.0, 0.7, 0.0).is_err());
        assert!(SolarCalParameter::new(Posture::Supine, 90.0, 0.7, 0.95).is_ok());
    }
}
