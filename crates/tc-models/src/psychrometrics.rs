//! Moist-air relations needed by the comfort models.

use tc_core::numeric::ZERO_CELSIUS_K;
use tc_core::units::{Pressure, Temperature, pa, to_kelvin, to_pa};

/// Saturation vapor pressure over water or ice (ASHRAE Hyland-Wexler).
pub fn saturated_vapor_pressure(t: Temperature) -> Pressure {
    let tk = to_kelvin(t);
    let ln_p_ws = if tk <= ZERO_CELSIUS_K {
        -5.674_535_9e3 / tk + 6.392_524_7 - 9.677_843_0e-3 * tk + 6.221_570_1e-7 * tk.powi(2)
            + 2.074_782_5e-9 * tk.powi(3)
            - 9.484_024_0e-13 * tk.powi(4)
            + 4.163_501_9 * tk.ln()
    } else {
        -5.800_220_6e3 / tk + 1.391_499_3 - 4.864_023_9e-2 * tk + 4.176_476_8e-5 * tk.powi(2)
            - 1.445_209_3e-8 * tk.powi(3)
            + 6.545_967_3 * tk.ln()
    };
    pa(ln_p_ws.exp())
}

/// Humidity ratio (kg water / kg dry air) from dry bulb (C) and relative
/// humidity (%).
pub fn humid_ratio_from_db_rh(db_temp: f64, rel_humid: f64, pressure: Pressure) -> f64 {
    let p_ws = to_pa(saturated_vapor_pressure(tc_core::units::degc(db_temp)));
    let p_w = rel_humid / 100.0 * p_ws;
    0.621_945 * p_w / (to_pa(pressure) - p_w)
}

/// Dew point (C) from dry bulb (C) and relative humidity (%), Magnus form.
pub fn dew_point_from_db_rh(db_temp: f64, rel_humid: f64) -> f64 {
    const B: f64 = 17.625;
    const C: f64 = 243.04;
    let gamma = (rel_humid / 100.0).ln() + B * db_temp / (C + db_temp);
    C * gamma / (B - gamma)
}
