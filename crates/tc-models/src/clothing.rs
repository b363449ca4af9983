//! Clothing level from the temperature people adapt their clothing to.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Piecewise-linear clothing schedule (Schiavon and Lee, as used by the CBE
/// comfort tool). Temperatures are in Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothingSchedule {
    /// Clothing on the coldest days (clo).
    pub max_clo: f64,
    /// Temperature at and below which `max_clo` is worn.
    pub max_clo_temp: f64,
    /// Clothing on the hottest days (clo).
    pub min_clo: f64,
    /// Temperature at and above which `min_clo` is worn.
    pub min_clo_temp: f64,
}

impl Default for ClothingSchedule {
    fn default() -> Self {
        Self {
            max_clo: 1.0,
            max_clo_temp: -5.0,
            min_clo: 0.46,
            min_clo_temp: 26.0,
        }
    }
}

impl ClothingSchedule {
    /// The cold ramp spans 10 C, so the two temperatures must be at least
    /// that far apart.
    pub fn validate(&self) -> ModelResult<()> {
        if self.min_clo_temp - self.max_clo_temp < 10.0 {
            return Err(ModelError::InvalidArg {
                what: format!(
                    "min_clo_temp must be at least 10 C above max_clo_temp, got {} and {}",
                    self.min_clo_temp, self.max_clo_temp
                ),
            });
        }
        Ok(())
    }

    /// Clothing level (clo) for an adaptation temperature, usually the
    /// outdoor air temperature.
    ///
    /// Three quarters of the clothing range is shed over the 10 C above
    /// `max_clo_temp`; the rest linearly up to `min_clo_temp`.
    pub fn clo(&self, adapt_temp: f64) -> ModelResult<f64> {
        self.validate()?;
        Ok(self.clo_unchecked(adapt_temp))
    }

    fn clo_unchecked(&self, adapt_temp: f64) -> f64 {
        let knee_clo = self.max_clo - (self.max_clo - self.min_clo) * 0.75;
        let knee_temp = self.max_clo_temp + 10.0;
        if adapt_temp <= self.max_clo_temp {
            self.max_clo
        } else if adapt_temp < knee_temp {
            let slope = (knee_clo - self.max_clo) / 10.0;
            self.max_clo + slope * (adapt_temp - self.max_clo_temp)
        } else if adapt_temp < self.min_clo_temp {
            let slope = (self.min_clo - knee_clo) / (self.min_clo_temp - knee_temp);
            self.min_clo + slope * (adapt_temp - self.min_clo_temp)
        } else {
            self.min_clo
        }
    }
}

/// Clothing level with the default schedule.
pub fn schiavon_clo(adapt_temp: f64) -> f64 {
    ClothingSchedule::default().clo_unchecked(adapt_temp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_reference_points() {
        let expected = [
            (-10.0, 1.0),
            (0.0, 0.7975),
            (10.0, 0.5628571428571428),
            (20.0, 0.49857142857142855),
            (30.0, 0.46),
        ];
        for (t, clo) in expected {
            assert!((schiavon_clo(t) - clo).abs() < 1e-9, "t {t}");
        }
    }

    #[test]
    fn schedule_is_continuous_at_the_knees() {
        let s = ClothingSchedule::default();
        let below = s.clo(5.0 - 1e-9).unwrap();
        let at = s.clo(5.0).unwrap();
        assert!((below - at).abs() < 1e-6);
        assert!((s.clo(26.0 - 1e-9).unwrap() - 0.46).abs() < 1e-6);
    }

    #[test]
    fn custom_schedule() {
        let s = ClothingSchedule {
            max_clo: 1.2,
            max_clo_temp: 0.0,
            min_clo: 0.5,
            min_clo_temp: 20.0,
        };
        assert_eq!(s.clo(0.0).unwrap(), 1.2);
        assert_eq!(s.clo(25.0).unwrap(), 0.5);
    }

    #[test]
    fn narrow_schedule_is_rejected() {
        let s = ClothingSchedule {
            max_clo_temp: 20.0,
            min_clo_temp: 25.0,
            ..ClothingSchedule::default()
        };
        assert!(matches!(s.clo(22.0), Err(ModelError::InvalidArg { .. })));
    }
}
