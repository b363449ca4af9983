use tc_core::CoreError;
use tc_models::ModelError;
use thiserror::Error;

pub type CriteriaResult<T> = Result<T, CriteriaError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriteriaError {
    #[error("Invalid comfort parameter: {what}")]
    InvalidArg { what: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<CriteriaError> for CoreError {
    fn from(err: CriteriaError) -> Self {
        match err {
            CriteriaError::InvalidArg { .. } => CoreError::InvalidArg {
                what: "comfort parameter",
            },
            CriteriaError::Model(e) => e.into(),
        }
    }
}
