//! Uniform access over the comfort collections.

use crate::adaptive::AdaptiveCollection;
use crate::input::Exposure;
use crate::pet::PetCollection;
use crate::pmv::PmvCollection;
use crate::summary::ComfortSeries;
use crate::utci::UtciCollection;
use tc_core::{TimeSeries, Timestep};
use tc_criteria::ThermalCondition;

#[derive(Debug, Clone)]
pub enum ComfortCollection {
    Utci(UtciCollection),
    Pmv(PmvCollection),
    Adaptive(AdaptiveCollection),
    Pet(PetCollection),
}

impl ComfortCollection {
    fn inner(&self) -> &dyn ComfortSeries {
        match self {
            ComfortCollection::Utci(c) => c,
            ComfortCollection::Pmv(c) => c,
            ComfortCollection::Adaptive(c) => c,
            ComfortCollection::Pet(c) => c,
        }
    }
}

impl ComfortSeries for ComfortCollection {
    fn model(&self) -> &'static str {
        self.inner().model()
    }

    fn header(&self) -> &Timestep {
        self.inner().header()
    }

    fn index(&self) -> &TimeSeries<f64> {
        self.inner().index()
    }

    fn is_comfortable(&self) -> &TimeSeries<bool> {
        self.inner().is_comfortable()
    }

    fn thermal_condition(&self) -> &TimeSeries<ThermalCondition> {
        self.inner().thermal_condition()
    }

    fn exposure(&self) -> Exposure {
        self.inner().exposure()
    }
}

impl From<UtciCollection> for ComfortCollection {
    fn from(c: UtciCollection) -> Self {
        ComfortCollection::Utci(c)
    }
}

impl From<PmvCollection> for ComfortCollection {
    fn from(c: PmvCollection) -> Self {
        ComfortCollection::Pmv(c)
    }
}

impl From<AdaptiveCollection> for ComfortCollection {
    fn from(c: AdaptiveCollection) -> Self {
        ComfortCollection::Adaptive(c)
    }
}

impl From<PetCollection> for ComfortCollection {
    fn from(c: PetCollection) -> Self {
        ComfortCollection::Pet(c)
    }
}
