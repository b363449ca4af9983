use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Offset between the Celsius and Kelvin scales.
pub const ZERO_CELSIUS_K: Real = 273.15;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Clamp `v` into `[lo, hi]` and report whether the value moved.
pub fn clamp_flagged(v: Real, lo: Real, hi: Real) -> (Real, bool) {
    if v < lo {
        (lo, true)
    } else if v > hi {
        (hi, true)
    } else {
        (v, false)
    }
}

/// Percentage of `count` over `total`. Callers guarantee `total > 0`.
#[inline]
pub fn percent(count: usize, total: usize) -> Real {
    count as Real / total as Real * 100.0
}
