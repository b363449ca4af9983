//! Adaptive thermal comfort (ASHRAE 55 and EN 15251).
//!
//! Neutral operative temperature is a linear function of the prevailing
//! outdoor temperature. Prevailing temperature is clamped to the range of
//! each standard; running means need at least one week of data.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default weight of the previous day in running means.
pub const DEFAULT_RUNNING_MEAN_ALPHA: f64 = 0.8;

const ASHRAE55_PREVAIL_RANGE: (f64, f64) = (10.0, 33.5);
const EN15251_PREVAIL_RANGE: (f64, f64) = (10.0, 30.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdaptiveStandard {
    #[serde(rename = "ASHRAE-55")]
    Ashrae55,
    #[serde(rename = "EN-15251")]
    En15251,
}

impl AdaptiveStandard {
    pub fn name(&self) -> &'static str {
        match self {
            AdaptiveStandard::Ashrae55 => "ASHRAE-55",
            AdaptiveStandard::En15251 => "EN-15251",
        }
    }

    /// Prevailing temperatures the standard's regression covers.
    pub fn prevailing_range(&self) -> (f64, f64) {
        match self {
            AdaptiveStandard::Ashrae55 => ASHRAE55_PREVAIL_RANGE,
            AdaptiveStandard::En15251 => EN15251_PREVAIL_RANGE,
        }
    }
}

/// Operative temperature, neutral temperature and their difference (C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveResult {
    pub to: f64,
    pub t_comf: f64,
    pub deg_comf: f64,
}

impl AdaptiveResult {
    fn new(to: f64, t_comf: f64) -> Self {
        Self {
            to,
            t_comf,
            deg_comf: to - t_comf,
        }
    }
}

/// Operative temperature as the mean of air and radiant temperature.
pub fn t_operative(ta: f64, tr: f64) -> f64 {
    (ta + tr) / 2.0
}

pub fn neutral_temperature_ashrae55(t_prevail: f64) -> f64 {
    0.31 * t_prevail + 17.8
}

pub fn neutral_temperature_en15251(t_prevail: f64) -> f64 {
    0.33 * t_prevail + 18.8
}

/// Neutral temperature blended toward the conditioned-building line.
///
/// `conditioning` is the fraction of the year the building is conditioned.
pub fn neutral_temperature_conditioned(
    t_prevail: f64,
    conditioning: f64,
    standard: AdaptiveStandard,
) -> f64 {
    if conditioning == 1.0 {
        return 0.09 * t_prevail + 22.6;
    }
    let inv = 1.0 - conditioning;
    let (slope, intercept) = match standard {
        AdaptiveStandard::Ashrae55 => (0.31, 17.8),
        AdaptiveStandard::En15251 => (0.33, 18.8),
    };
    (0.09 * conditioning + slope * inv) * t_prevail + (22.6 * conditioning + intercept * inv)
}

fn clamp_prevailing(t_prevail: f64, (lo, hi): (f64, f64)) -> f64 {
    let clamped = t_prevail.clamp(lo, hi);
    if clamped != t_prevail {
        debug!(t_prevail, clamped, "prevailing temperature clamped");
    }
    clamped
}

pub fn adaptive_comfort_ashrae55(t_prevail: f64, to: f64) -> AdaptiveResult {
    let tp = clamp_prevailing(t_prevail, ASHRAE55_PREVAIL_RANGE);
    AdaptiveResult::new(to, neutral_temperature_ashrae55(tp))
}

pub fn adaptive_comfort_en15251(t_prevail: f64, to: f64) -> AdaptiveResult {
    let tp = clamp_prevailing(t_prevail, EN15251_PREVAIL_RANGE);
    AdaptiveResult::new(to, neutral_temperature_en15251(tp))
}

pub fn adaptive_comfort_conditioned(
    t_prevail: f64,
    to: f64,
    conditioning: f64,
    standard: AdaptiveStandard,
) -> AdaptiveResult {
    let tp = clamp_prevailing(t_prevail, EN15251_PREVAIL_RANGE);
    AdaptiveResult::new(to, neutral_temperature_conditioned(tp, conditioning, standard))
}

/// Discrete ASHRAE 55 cooling effect of elevated air speed (C).
pub fn cooling_effect_ashrae55(vel: f64, to: f64) -> f64 {
    if vel < 0.6 || to < 25.0 {
        0.0
    } else if vel < 0.9 {
        1.2
    } else if vel < 1.2 {
        1.8
    } else {
        2.2
    }
}

/// Continuous EN 15251 cooling effect of elevated air speed (C).
pub fn cooling_effect_en15251(vel: f64, to: f64) -> f64 {
    if vel >= 0.2 && to >= 25.0 {
        1.7856 * vel.ln() + 2.9835
    } else {
        0.0
    }
}

/// ASHRAE 55 neutral offset for a target percentage of satisfied occupants.
pub fn ashrae55_neutral_offset_from_ppd(ppd: f64) -> ModelResult<f64> {
    if !(0.0..=100.0).contains(&ppd) {
        return Err(ModelError::OutOfRange {
            what: "ppd must be between 0 and 100",
            value: ppd,
        });
    }
    Ok(-0.1 * ppd + 11.5)
}

/// EN 15251 neutral offset for comfort class 1, 2 or 3.
pub fn en15251_neutral_offset_from_comfort_class(comfort_class: u8) -> ModelResult<f64> {
    match comfort_class {
        1 => Ok(2.0),
        2 => Ok(3.0),
        3 => Ok(4.0),
        other => Err(ModelError::InvalidArg {
            what: format!("comfort class {other} is not one of 1, 2, 3"),
        }),
    }
}

/// True when `t_prevail` lies in the range the standard was derived for.
pub fn prevailing_in_range(t_prevail: f64, standard: AdaptiveStandard) -> bool {
    let (lo, hi) = standard.prevailing_range();
    (lo..=hi).contains(&t_prevail)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Seed for a running mean: last six daily means weighted by powers of alpha.
fn running_mean_seed(daily_means_from_end: impl Iterator<Item = f64>, alpha: f64) -> f64 {
    let mut dividend = 0.0;
    let mut divisor = 0.0;
    for (k, value) in daily_means_from_end.take(6).enumerate() {
        let w = alpha.powi(k as i32);
        dividend += w * value;
        divisor += w;
    }
    dividend / divisor
}

/// Exponentially weighted running mean of hourly outdoor temperatures.
///
/// The first day is seeded from the last week of the series (the data is
/// treated as wrapping around the year). Every hour of a day shares that
/// day's value. Needs at least 168 values.
pub fn weighted_running_mean_hourly(temps: &[f64], alpha: f64) -> ModelResult<Vec<f64>> {
    if temps.len() < 168 {
        return Err(ModelError::InvalidArg {
            what: format!(
                "running mean needs at least a week (168 hourly values), got {}",
                temps.len()
            ),
        });
    }

    let n = temps.len();
    let seed = running_mean_seed(
        (1..=6).map(|d| mean(&temps[n - 24 * d..n - 24 * (d - 1)])),
        alpha,
    );

    let mut prevailing = Vec::with_capacity(n);
    let mut run_mean = seed;
    let mut prev_daily_mean = mean(&temps[..24]);
    prevailing.extend(std::iter::repeat_n(run_mean, 24));

    for day in temps.chunks_exact(24).skip(1) {
        run_mean = (1.0 - alpha) * prev_daily_mean + alpha * run_mean;
        prev_daily_mean = mean(day);
        prevailing.extend(std::iter::repeat_n(run_mean, 24));
    }

    if prevailing.len() < n {
        let extra = (1.0 - alpha) * prev_daily_mean + alpha * run_mean;
        prevailing.resize(n, extra);
    }
    Ok(prevailing)
}

/// Exponentially weighted running mean of daily mean temperatures.
///
/// Needs at least 7 values. Each day uses the previous day's value
/// (`temps[k - 1]`) throughout. The widely used Python routine lags one extra
/// day from the third value on and counts day 0 twice, so results differ
/// slightly from it.
pub fn weighted_running_mean_daily(temps: &[f64], alpha: f64) -> ModelResult<Vec<f64>> {
    if temps.len() < 7 {
        return Err(ModelError::InvalidArg {
            what: format!("running mean needs at least 7 daily values, got {}", temps.len()),
        });
    }

    let seed = running_mean_seed(temps.iter().rev().copied(), alpha);
    let mut run_means = Vec::with_capacity(temps.len());
    run_means.push(seed);
    for yesterday in &temps[..temps.len() - 1] {
        let last = run_means[run_means.len() - 1];
        run_means.push((1.0 - alpha) * yesterday + alpha * last);
    }
    Ok(run_means)
}

/// Prevailing temperature as the calendar-month mean of each timestep.
///
/// `months` gives the month (1-12) of every value.
pub fn monthly_average_prevailing(
    temps: &[f64],
    months: impl IntoIterator<Item = u32>,
) -> ModelResult<Vec<f64>> {
    let months: Vec<u32> = months.into_iter().collect();
    if months.len() != temps.len() {
        return Err(ModelError::InvalidArg {
            what: format!(
                "{} month labels for {} temperatures",
                months.len(),
                temps.len()
            ),
        });
    }

    let mut sums = [0.0; 12];
    let mut counts = [0usize; 12];
    for (t, m) in temps.iter().zip(&months) {
        let idx = (*m as usize).checked_sub(1).filter(|i| *i < 12).ok_or(
            ModelError::OutOfRange {
                what: "month",
                value: f64::from(*m),
            },
        )?;
        sums[idx] += t;
        counts[idx] += 1;
    }

    Ok(months
        .iter()
        .map(|m| {
            let idx = *m as usize - 1;
            sums[idx] / counts[idx] as f64
        })
        .collect())
}
