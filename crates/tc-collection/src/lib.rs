//! tc-collection: comfort indices over aligned time series.
//!
//! Contains:
//! - input (series-or-constant inputs, exposure flags, alignment checks)
//! - utci / pmv / adaptive / pet (eager per-timestep evaluation + classification)
//! - solarcal (outdoor and indoor MRT from sun position and irradiance)
//! - summary (ComfortSeries trait with on-demand percent statistics)
//! - comfort (ComfortCollection enum over the four comfort models)
//!
//! Construction is the only computation point. Timesteps are evaluated in
//! parallel with rayon; each step writes only its own slot, so results are
//! identical to a sequential run.

pub mod adaptive;
pub mod comfort;
pub mod error;
pub mod input;
pub mod pet;
pub mod pmv;
pub mod solarcal;
pub mod summary;
pub mod utci;

pub use adaptive::{AdaptiveCollection, Prevailing, prevailing_from_outdoor};
pub use comfort::ComfortCollection;
pub use error::{CollectionError, CollectionResult};
pub use input::{Exposure, Input};
pub use pet::{PetCollection, PetSeries};
pub use pmv::{HeatLossTerm, PmvCollection, PmvDetail, PmvSeries};
pub use solarcal::{IndoorSolarCalCollection, OutdoorSolarCalCollection, SolarSeries};
pub use summary::{ComfortSeries, ComfortSummary};
pub use utci::{UtciCollection, UtciSeries};
