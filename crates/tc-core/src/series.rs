//! Aligned time series with a shared timestep definition.
//!
//! A [`Timestep`] header (start, interval, count) is carried by every
//! [`TimeSeries`]. Computations that combine several series first check that
//! all headers are identical; misaligned inputs are a hard error.

use crate::error::{CoreError, CoreResult};
use chrono::{Datelike, NaiveDateTime, TimeDelta};

/// Timestep definition shared by aligned series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TimestepSpec"))]
pub struct Timestep {
    /// Timestamp of the first value.
    pub start: NaiveDateTime,
    /// Minutes between consecutive values.
    pub interval_minutes: u32,
    /// Number of values.
    pub count: usize,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct TimestepSpec {
    start: NaiveDateTime,
    interval_minutes: u32,
    count: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<TimestepSpec> for Timestep {
    type Error = CoreError;

    fn try_from(s: TimestepSpec) -> CoreResult<Self> {
        Timestep::new(s.start, s.interval_minutes, s.count)
    }
}

impl Timestep {
    pub fn new(start: NaiveDateTime, interval_minutes: u32, count: usize) -> CoreResult<Self> {
        if interval_minutes == 0 {
            return Err(CoreError::InvalidArg {
                what: "interval_minutes must be positive",
            });
        }
        Ok(Self {
            start,
            interval_minutes,
            count,
        })
    }

    /// Hourly timestep starting at `start`.
    pub fn hourly(start: NaiveDateTime, count: usize) -> Self {
        Self {
            start,
            interval_minutes: 60,
            count,
        }
    }

    /// Timestamp of value `index`.
    pub fn datetime_at(&self, index: usize) -> NaiveDateTime {
        self.start + TimeDelta::minutes(i64::from(self.interval_minutes) * index as i64)
    }

    /// Calendar month (1-12) of every timestep.
    pub fn months(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.count).map(|i| self.datetime_at(i).month())
    }

    /// Values per day, when the interval divides a day evenly.
    pub fn steps_per_day(&self) -> Option<usize> {
        let per_day = 24 * 60;
        if per_day % self.interval_minutes == 0 {
            Some((per_day / self.interval_minutes) as usize)
        } else {
            None
        }
    }
}

/// Ordered values, one per timestep.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "TimeSeriesSpec<T>",
        bound(deserialize = "T: serde::Deserialize<'de>")
    )
)]
pub struct TimeSeries<T> {
    header: Timestep,
    values: Vec<T>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct TimeSeriesSpec<T> {
    header: Timestep,
    values: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<TimeSeriesSpec<T>> for TimeSeries<T> {
    type Error = CoreError;

    fn try_from(s: TimeSeriesSpec<T>) -> CoreResult<Self> {
        TimeSeries::new(s.header, s.values)
    }
}

impl<T> TimeSeries<T> {
    /// Build a series; the value count must equal the header count.
    pub fn new(header: Timestep, values: Vec<T>) -> CoreResult<Self> {
        if values.len() != header.count {
            return Err(CoreError::Alignment {
                what: "series values vs timestep count".to_string(),
                expected: header.count,
                found: values.len(),
            });
        }
        Ok(Self { header, values })
    }

    pub fn header(&self) -> &Timestep {
        &self.header
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> CoreResult<&T> {
        self.values.get(index).ok_or(CoreError::IndexOob {
            what: "time series",
            index,
            len: self.values.len(),
        })
    }

    /// New series on the same header with every value mapped.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> TimeSeries<U> {
        TimeSeries {
            header: self.header,
            values: self.values.iter().map(f).collect(),
        }
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }
}

impl<T: Clone> TimeSeries<T> {
    /// Series holding the same value at every timestep.
    pub fn constant(header: Timestep, value: T) -> Self {
        Self {
            header,
            values: vec![value; header.count],
        }
    }
}

/// Check that every named series shares `header`.
pub fn check_aligned<T>(header: &Timestep, series: &[(&str, &TimeSeries<T>)]) -> CoreResult<()> {
    for (name, s) in series {
        if s.len() != header.count {
            return Err(CoreError::Alignment {
                what: (*name).to_string(),
                expected: header.count,
                found: s.len(),
            });
        }
        if s.header() != header {
            return Err(CoreError::TimestepMismatch {
                what: (*name).to_string(),
            });
        }
    }
    Ok(())
}
