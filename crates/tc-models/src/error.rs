use tc_core::error::CoreError;
use tc_solver::SolverError;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Input out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

impl From<ModelError> for CoreError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::OutOfRange { what, .. } => CoreError::InvalidArg { what },
            ModelError::InvalidArg { .. } => CoreError::InvalidArg { what: "model input" },
            ModelError::Solver(inner) => inner.into(),
        }
    }
}
