//! Per-timestep inputs: an aligned series or one value for every step.

use crate::error::{CollectionError, CollectionResult};
use serde::{Deserialize, Serialize};
use tc_core::{TimeSeries, Timestep, check_aligned};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input<'a> {
    Series(&'a TimeSeries<f64>),
    Constant(f64),
}

impl Input<'_> {
    #[inline]
    pub fn at(&self, index: usize) -> f64 {
        match self {
            Input::Series(s) => s.values()[index],
            Input::Constant(v) => *v,
        }
    }

    pub fn series(&self) -> Option<&TimeSeries<f64>> {
        match self {
            Input::Series(s) => Some(s),
            Input::Constant(_) => None,
        }
    }
}

impl<'a> From<&'a TimeSeries<f64>> for Input<'a> {
    fn from(series: &'a TimeSeries<f64>) -> Self {
        Input::Series(series)
    }
}

impl From<f64> for Input<'_> {
    fn from(value: f64) -> Self {
        Input::Constant(value)
    }
}

/// Which outdoor exposures a collection's inputs account for.
///
/// Fixed at construction; a different exposure needs a new collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exposure {
    pub wind: bool,
    pub sun: bool,
}

/// Header of the base series, after checking it is non-empty and that every
/// series input shares it.
pub(crate) fn aligned_header(
    base_name: &'static str,
    base: &TimeSeries<f64>,
    others: &[(&str, Option<Input<'_>>)],
) -> CollectionResult<Timestep> {
    if base.is_empty() {
        return Err(CollectionError::EmptyInput { what: base_name });
    }
    let header = *base.header();
    let series: Vec<(&str, &TimeSeries<f64>)> = others
        .iter()
        .filter_map(|(name, input)| input.as_ref().and_then(Input::series).map(|s| (*name, s)))
        .collect();
    check_aligned(&header, &series)?;
    Ok(header)
}
