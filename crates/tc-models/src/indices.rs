//! Single-formula outdoor indices and their warning scales.
//!
//! All temperatures are in Celsius; these never fail and extrapolate
//! outside their published ranges. Category scales are signed: negative is
//! cold stress, zero no stress, positive heat stress.

use crate::psychrometrics::saturated_vapor_pressure;
use tc_core::units::{degc, to_pa};

/// Humidex from dry bulb and dew point temperature.
pub fn humidex(ta: f64, tdp: f64) -> f64 {
    let dew_point_k = tdp + 273.15;
    let e = 6.11 * (5417.753 * ((1.0 / 273.16) - (1.0 / dew_point_k))).exp();
    ta + 0.5555 * (e - 10.0)
}

/// NOAA heat index (C) from air temperature and relative humidity (%).
///
/// Uses the simple Steadman average below 80 F and the Rothfusz regression
/// with its low and high humidity adjustments above.
pub fn heat_index(ta: f64, rh: f64) -> f64 {
    let tf = ta * 9.0 / 5.0 + 32.0;
    let hif = if tf < 80.0 {
        0.5 * (tf + 61.0 + (tf - 68.0) * 1.2 + rh * 0.094)
    } else {
        let mut h = -42.379 + 2.04901523 * tf + 10.14333127 * rh
            - 0.22475541 * tf * rh
            - 0.00683783 * tf * tf
            - 0.05481717 * rh * rh
            + 0.00122874 * tf * tf * rh
            + 0.00085282 * tf * rh * rh
            - 1.99e-6 * tf * tf * rh * rh;
        if (80.0..=112.0).contains(&tf) && rh < 13.0 {
            h -= (13.0 - rh) / 4.0 * ((17.0 - (tf - 95.0).abs()) / 17.0).sqrt();
        } else if (80.0..=87.0).contains(&tf) && rh > 85.0 {
            h += (rh - 85.0) / 10.0 * ((87.0 - tf) / 5.0);
        }
        h
    };
    (hif - 32.0) * 5.0 / 9.0
}

/// Heat index warning level: 0 none, 1 caution, 2 extreme caution,
/// 3 danger, 4 extreme danger.
pub fn heat_index_warning_category(hi: f64) -> u8 {
    if hi < 26.6 {
        0
    } else if hi < 32.2 {
        1
    } else if hi < 40.5 {
        2
    } else if hi < 54.4 {
        3
    } else {
        4
    }
}

/// Wind chill temperature from air temperature and wind speed (m/s).
pub fn windchill_temp(ta: f64, ws: f64) -> f64 {
    let v = (ws * 3.6).powf(0.16);
    13.12 + 0.6215 * ta - 11.37 * v + 0.3965 * ta * v
}

/// Wind chill effect from 0 (no risk) down to -6 (extreme risk).
pub fn windchill_temp_effect_category(wct: f64) -> i8 {
    match wct {
        w if w >= 0.0 => 0,
        w if w >= -9.0 => -1,
        w if w >= -27.0 => -2,
        w if w >= -39.0 => -3,
        w if w >= -47.0 => -4,
        w if w >= -54.0 => -5,
        _ => -6,
    }
}

/// Siple-Passel wind chill index (W/m2).
pub fn windchill_index(ta: f64, ws: f64) -> f64 {
    (10.0 * ws.sqrt() + 10.45 - ws) * (33.0 - ta) * 1.163
}

/// Outdoor wet bulb globe temperature, estimating natural wet bulb and
/// globe temperature from standard weather variables.
///
/// `ws` is in m/s and `rh` in percent.
pub fn wet_bulb_globe_temperature(ta: f64, mrt: f64, ws: f64, rh: f64) -> f64 {
    // Vapor pressure in hPa.
    let vp = to_pa(saturated_vapor_pressure(degc(ta))) * rh / 10_000.0;
    let tnwb = -9.27522 + 0.70196 * ta + 0.30338 * vp + 0.07823 * rh;
    let tg = 2.098 - 2.561 * ws + 0.5957 * ta + 0.4017 * mrt;
    0.7 * tnwb + 0.2 * tg + 0.1 * ta
}

/// WBGT work/rest guidance from 0 (no limit) to 4 (extreme heat).
///
/// Thresholds are the US flag conditions in Fahrenheit.
pub fn wbgt_warning_category(wbgt: f64) -> u8 {
    let wbgt_f = wbgt * 9.0 / 5.0 + 32.0;
    if wbgt_f < 80.0 {
        0
    } else if wbgt_f < 85.0 {
        1
    } else if wbgt_f < 88.0 {
        2
    } else if wbgt_f < 90.0 {
        3
    } else {
        4
    }
}

/// Australian apparent temperature (non-radiative form). Wind is in km/h.
pub fn apparent_temperature(ta: f64, rh: f64, ws: f64) -> f64 {
    let e = rh / 100.0 * 6.105 * (17.27 * ta / (237.7 + ta)).exp();
    ta + 0.33 * e - 0.70 * ws - 4.0
}

/// Apparent temperature sensation from -6 (extreme cold) to 4 (extreme heat).
pub fn apparent_temperature_warning_category(at: f64) -> i8 {
    match at {
        a if a > 40.0 => 4,
        a if a > 35.0 => 3,
        a if a > 30.0 => 2,
        a if a > 25.0 => 1,
        a if a > 20.0 => 0,
        a if a > 15.0 => -1,
        a if a > 10.0 => -2,
        a if a > 5.0 => -3,
        a if a > 0.0 => -4,
        a if a > -5.0 => -5,
        _ => -6,
    }
}

/// Thom discomfort index from air temperature and relative humidity (%).
pub fn discomfort_index(ta: f64, rh: f64) -> f64 {
    ta - (0.55 - 0.0055 * rh) * (ta - 14.5)
}

/// Discomfort index effect from -6 (hyper-glacial) to 3 (torrid).
pub fn discomfort_index_effect_category(di: f64) -> i8 {
    match di {
        d if d >= 30.0 => 3,
        d if d >= 26.5 => 2,
        d if d >= 20.0 => 1,
        d if d >= 15.0 => 0,
        d if d >= 13.0 => -1,
        d if d >= -1.8 => -2,
        d if d >= -10.0 => -3,
        d if d >= -20.0 => -4,
        d if d >= -40.0 => -5,
        _ => -6,
    }
}

/// Effective temperature with its radiative correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveTemperature {
    /// Effective temperature (C).
    pub te: f64,
    /// Radiative-effective temperature (C).
    pub tre: f64,
    /// Effect from -4 (very cold) to 2 (hot), see
    /// [`effective_temperature_effect_category`].
    pub category: i8,
}

/// Effective temperature (Missenard in still air, Gregorczuk above 0.2 m/s)
/// corrected for solar radiation `sr` (W/m2) and `ac`, the clothing albedo
/// (%).
pub fn effective_temperature(ta: f64, ws: f64, rh: f64, sr: f64, ac: f64) -> EffectiveTemperature {
    let te = if ws <= 0.2 {
        ta - 0.4 * (ta - 10.0) * (1.0 - rh / 100.0)
    } else {
        37.0 - (37.0 - ta) / (0.68 - 0.0014 * rh + 1.0 / (1.76 + 1.4 * ws.powf(0.75)))
            - 0.29 * ta * (1.0 - 0.01 * rh)
    };
    let tre = te + (1.0 - 0.01 * ac) * sr * ((0.0155 - 0.00025 * te) - (0.0043 - 0.00011 * te));
    EffectiveTemperature {
        te,
        tre,
        category: effective_temperature_effect_category(tre),
    }
}

/// Effect of a radiative-effective temperature from -4 (very cold) to 2 (hot).
pub fn effective_temperature_effect_category(tre: f64) -> i8 {
    match tre {
        t if t < 1.0 => -4,
        t if t < 9.0 => -3,
        t if t < 17.0 => -2,
        t if t < 21.0 => -1,
        t if t < 23.0 => 0,
        t if t < 27.0 => 1,
        _ => 2,
    }
}

/// Givoni-Noguchi outdoor thermal sensation from air temperature, wind
/// (m/s), relative humidity (%), solar radiation (W/m2) and ground
/// temperature.
pub fn thermal_sensation(ta: f64, ws: f64, rh: f64, sr: f64, tground: f64) -> f64 {
    1.7 + 0.1118 * ta + 0.0019 * sr - 0.322 * ws - 0.0073 * rh + 0.0054 * tground
}

/// Thermal sensation from -3 (very cold) to 3 (very hot).
pub fn thermal_sensation_effect_category(ts: f64) -> i8 {
    match ts {
        t if t >= 7.0 => 3,
        t if t >= 6.0 => 2,
        t if t >= 5.0 => 1,
        t if t >= 4.0 => 0,
        t if t >= 3.0 => -1,
        t if t >= 2.0 => -2,
        _ => -3,
    }
}

/// Actual sensation vote (Nikolopoulou) from air temperature, wind (m/s),
/// relative humidity (%) and solar radiation (W/m2).
pub fn actual_sensation_vote(ta: f64, ws: f64, rh: f64, sr: f64) -> f64 {
    0.049 * ta + 0.001 * sr - 0.051 * ws + 0.014 * rh - 2.079
}

/// Actual sensation vote from -2 (very cold) to 2 (very hot).
pub fn actual_sensation_vote_effect_category(asv: f64) -> i8 {
    match asv {
        a if a > 2.0 => 2,
        a if a > 1.0 => 1,
        a if a >= -1.0 => 0,
        a if a >= -2.0 => -1,
        _ => -2,
    }
}

/// Degrees below `base` at one timestep; zero when warmer.
pub fn heating_degree_time(temperature: f64, base: f64) -> f64 {
    (base - temperature).max(0.0)
}

/// Degrees above `base` at one timestep; zero when cooler.
pub fn cooling_degree_time(temperature: f64, base: f64) -> f64 {
    (temperature - base).max(0.0)
}

/// Default heating degree-time base temperature (C).
pub const HEATING_BASE_TEMPERATURE: f64 = 18.0;
/// Default cooling degree-time base temperature (C).
pub const COOLING_BASE_TEMPERATURE: f64 = 23.0;
