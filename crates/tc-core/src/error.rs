use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Input alignment error: {what} (expected {expected} values, got {found})")]
    Alignment {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Input alignment error: {what} does not share the timestep definition")]
    TimestepMismatch { what: String },
}
