//! Percent statistics shared by every comfort collection.

use crate::input::Exposure;
use serde::{Deserialize, Serialize};
use tc_core::{TimeSeries, Timestep, percent};
use tc_criteria::ThermalCondition;

/// Percent of timesteps per thermal condition. The four shares sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComfortSummary {
    pub model: String,
    pub count: usize,
    pub percent_comfortable: f64,
    pub percent_neutral: f64,
    pub percent_hot: f64,
    pub percent_cold: f64,
    pub percent_unresolved: f64,
}

/// Read access to a computed comfort series.
///
/// Percentages are recomputed from the stored series on every call.
pub trait ComfortSeries {
    fn model(&self) -> &'static str;

    fn header(&self) -> &Timestep;

    /// The model's scalar index (UTCI, PMV, or degrees from neutral).
    fn index(&self) -> &TimeSeries<f64>;

    fn is_comfortable(&self) -> &TimeSeries<bool>;

    fn thermal_condition(&self) -> &TimeSeries<ThermalCondition>;

    fn exposure(&self) -> Exposure;

    fn len(&self) -> usize {
        self.header().count
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn percent_comfortable(&self) -> f64 {
        percent_where(self.is_comfortable(), |c| *c)
    }

    fn percent_uncomfortable(&self) -> f64 {
        percent_where(self.is_comfortable(), |c| !*c)
    }

    fn percent_neutral(&self) -> f64 {
        self.percent_condition(ThermalCondition::Neutral)
    }

    fn percent_hot(&self) -> f64 {
        self.percent_condition(ThermalCondition::Hot)
    }

    fn percent_cold(&self) -> f64 {
        self.percent_condition(ThermalCondition::Cold)
    }

    /// Timesteps whose model did not converge.
    fn percent_unresolved(&self) -> f64 {
        self.percent_condition(ThermalCondition::Unresolved)
    }

    fn percent_condition(&self, condition: ThermalCondition) -> f64 {
        percent_where(self.thermal_condition(), |c| *c == condition)
    }

    fn summary(&self) -> ComfortSummary {
        ComfortSummary {
            model: self.model().to_string(),
            count: self.len(),
            percent_comfortable: self.percent_comfortable(),
            percent_neutral: self.percent_neutral(),
            percent_hot: self.percent_hot(),
            percent_cold: self.percent_cold(),
            percent_unresolved: self.percent_unresolved(),
        }
    }
}

/// Percent of values matching `pred`. Collections are never empty.
pub(crate) fn percent_where<T>(series: &TimeSeries<T>, pred: impl Fn(&T) -> bool) -> f64 {
    let hits = series.values().iter().filter(|v| pred(v)).count();
    percent(hits, series.len())
}
