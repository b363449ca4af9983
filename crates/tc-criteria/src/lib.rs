//! tc-criteria: comfort thresholds and category labels.
//!
//! Contains:
//! - condition (ThermalCondition, DiscomfortReason, UtciCategory)
//! - utci (UtciParameter: comfort band + stress scales)
//! - pmv (PmvParameter: PPD limit + humidity band)
//! - adaptive (AdaptiveParameter: neutral offset, prevailing and air speed methods)
//! - pet (PetParameter: body characteristics + temperate or humid PET scale)
//!
//! Boundary convention for every model: a value strictly below a cold
//! threshold or strictly above a heat threshold leaves the band. Values
//! exactly on a threshold fall on the side nearer neutral.

pub mod adaptive;
pub mod condition;
pub mod error;
pub mod pet;
pub mod pmv;
pub mod utci;

pub use adaptive::{AdaptiveParameter, AdaptiveParameterSpec, AirSpeedMethod, PrevailingMethod};
pub use condition::{DiscomfortReason, ThermalCondition, UtciCategory};
pub use error::{CriteriaError, CriteriaResult};
pub use pet::PetParameter;
pub use pmv::PmvParameter;
pub use utci::{StressScale, UtciParameter, UtciThresholds};

/// Maps a scalar comfort index onto categories.
pub trait Criteria {
    type Category;

    /// Short model name, used in logs and reports.
    fn model(&self) -> &'static str;

    /// Model-specific category of an index value.
    fn categorize(&self, value: f64) -> Self::Category;

    /// Three-way condition of an index value.
    fn condition(&self, value: f64) -> ThermalCondition;
}
