//! Error types for root finding.

use tc_core::error::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid bracket: {what}")]
    InvalidBracket { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for CoreError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidBracket { .. } => CoreError::InvalidArg { what: "bracket" },
            SolverError::ConvergenceFailed { .. } => CoreError::InvalidArg {
                what: "convergence",
            },
        }
    }
}
