//! Secant and bisection root finding on a scalar function.

use crate::error::{SolverError, SolverResult};
use tracing::debug;

/// Secant iteration cap.
pub const MAX_SECANT_ITERATIONS: usize = 100;
/// Bisection iteration cap; halving 200 times exhausts f64 precision.
pub const MAX_BISECT_ITERATIONS: usize = 200;

/// Search bracket and tolerance for model inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootConfig {
    /// Lower bound of the search.
    pub low: f64,
    /// Upper bound of the search.
    pub up: f64,
    /// Absolute tolerance on the function value (secant) or bracket (bisection).
    pub tolerance: f64,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            low: 0.0,
            up: 100.0,
            tolerance: 0.001,
        }
    }
}

/// Secant method starting from `a` and `b`.
///
/// Returns `None` when the iteration stalls (flat secant) or does not reach
/// `|f(x)| < epsilon` within [`MAX_SECANT_ITERATIONS`].
pub fn secant<F>(mut a: f64, mut b: f64, f: F, epsilon: f64) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let mut f1 = f(a);
    if f1.abs() <= epsilon {
        return Some(a);
    }
    let mut f2 = f(b);
    if f2.abs() <= epsilon {
        return Some(b);
    }

    for _ in 0..MAX_SECANT_ITERATIONS {
        let slope = (f2 - f1) / (b - a);
        if slope == 0.0 || !slope.is_finite() {
            return None;
        }
        let c = b - f2 / slope;
        let f3 = f(c);
        if !f3.is_finite() {
            return None;
        }
        if f3.abs() < epsilon {
            return Some(c);
        }
        a = b;
        b = c;
        f1 = f2;
        f2 = f3;
    }
    None
}

/// Secant method applied component by component to a system of `N` residuals.
///
/// Each unknown `j` is updated from its own residual `f(x)[j]` only; the
/// coupling between components enters through `f`. Converges when every
/// residual is below `epsilon`. Returns `None` on a flat secant, a
/// non-finite value or after [`MAX_SECANT_ITERATIONS`].
pub fn secant_componentwise<const N: usize, F>(
    mut a: [f64; N],
    mut b: [f64; N],
    f: F,
    epsilon: f64,
) -> Option<[f64; N]>
where
    F: Fn(&[f64; N]) -> [f64; N],
{
    let mut fa = f(&a);
    let mut fb = f(&b);
    if fa.iter().chain(fb.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    for _ in 0..MAX_SECANT_ITERATIONS {
        let mut next = b;
        for j in 0..N {
            let denom = fb[j] - fa[j];
            if denom == 0.0 {
                return None;
            }
            next[j] = b[j] - fb[j] * (b[j] - a[j]) / denom;
        }
        a = b;
        fa = fb;
        b = next;
        fb = f(&b);
        if fb.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return None;
        }
        if fb.iter().all(|v| v.abs() < epsilon) {
            return Some(b);
        }
    }
    None
}

/// Bisection for `f(x) == target` on `[a, b]`.
///
/// Returns `None` when the bracket does not straddle the target.
pub fn bisect<F>(mut a: f64, mut b: f64, f: F, epsilon: f64, target: f64) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let mut midpoint = (a + b) / 2.0;
    let mut iterations = 0;
    while (b - a).abs() > 2.0 * epsilon {
        if iterations == MAX_BISECT_ITERATIONS {
            return None;
        }
        iterations += 1;

        midpoint = (a + b) / 2.0;
        let a_t = f(a);
        let b_t = f(b);
        let mid_t = f(midpoint);
        if (a_t - target) * (mid_t - target) < 0.0 {
            b = midpoint;
        } else if (b_t - target) * (mid_t - target) < 0.0 {
            a = midpoint;
        } else {
            return None;
        }
    }
    Some(midpoint)
}

/// Find a root of `f` on the configured bracket.
///
/// Tries the secant method first (when `use_secant` is set) and falls back to
/// bisection.
pub fn solve_secant_then_bisect<F>(f: F, config: &RootConfig, use_secant: bool) -> SolverResult<f64>
where
    F: Fn(f64) -> f64,
{
    if config.up <= config.low {
        return Err(SolverError::InvalidBracket {
            what: format!("low {} must be below up {}", config.low, config.up),
        });
    }

    if use_secant {
        if let Some(x) = secant(config.low, config.up, &f, config.tolerance) {
            return Ok(x);
        }
        debug!(
            low = config.low,
            up = config.up,
            "secant failed, falling back to bisection"
        );
    }

    bisect(config.low, config.up, &f, config.tolerance, 0.0).ok_or_else(|| {
        SolverError::ConvergenceFailed {
            what: format!(
                "no root found in [{}, {}] with tolerance {}",
                config.low, config.up, config.tolerance
            ),
        }
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn linear_roots_found(root in 1.0_f64..99.0, slope in 0.1_f64..10.0) {
            let cfg = RootConfig::default();
            let x = solve_secant_then_bisect(|x| slope * (x - root), &cfg, true).unwrap();
            prop_assert!((x - root).abs() < 0.01);
        }
    }
}
