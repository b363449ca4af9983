//! tc-core: stable foundation for thermocomfort.
//!
//! Contains:
//! - units (uom SI types + constructors for the quantities comfort models need)
//! - numeric (Real + float helpers)
//! - series (timestep header + aligned time series)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod series;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use series::{TimeSeries, Timestep, check_aligned};
pub use units::*;
