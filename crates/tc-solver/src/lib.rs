//! Scalar root finding for inverting comfort models.
//!
//! Comfort models are cheap scalar functions, so inversion (find the input
//! that yields a target index) uses a secant pass with a bisection fallback.
//! Iterative models share the [`Convergence`] tag defined here.

pub mod convergence;
pub mod error;
pub mod roots;

pub use convergence::Convergence;
pub use error::{SolverError, SolverResult};
pub use roots::{
    RootConfig, bisect, secant, secant_componentwise, solve_secant_then_bisect,
};
