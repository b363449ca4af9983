/// Outcome tag for bounded iterative computations.
///
/// Non-convergence is an expected result for extreme inputs, so it is
/// reported as data rather than as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    Converged {
        iterations: usize,
    },
    NonConverged {
        iterations: usize,
        /// Which loop hit its bound.
        stage: &'static str,
    },
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    pub fn iterations(&self) -> usize {
        match self {
            Convergence::Converged { iterations } | Convergence::NonConverged { iterations, .. } => {
                *iterations
            }
        }
    }

    /// Combine two tags; the first non-converged one wins.
    pub fn and(self, other: Convergence) -> Convergence {
        match (self, other) {
            (Convergence::NonConverged { .. }, _) => self,
            (_, Convergence::NonConverged { .. }) => other,
            (
                Convergence::Converged { iterations: a },
                Convergence::Converged { iterations: b },
            ) => Convergence::Converged { iterations: a + b },
        }
    }
}
