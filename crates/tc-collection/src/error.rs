use tc_core::CoreError;
use tc_criteria::CriteriaError;
use tc_models::ModelError;
use thiserror::Error;

pub type CollectionResult<T> = Result<T, CollectionError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectionError {
    #[error("Empty input series: {what}")]
    EmptyInput { what: &'static str },

    #[error("Missing input: {what}")]
    MissingInput { what: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Criteria(#[from] CriteriaError),
}

impl From<CollectionError> for CoreError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::EmptyInput { what } => CoreError::InvalidArg { what },
            CollectionError::MissingInput { .. } => CoreError::InvalidArg {
                what: "missing collection input",
            },
            CollectionError::Core(e) => e,
            CollectionError::Model(e) => e.into(),
            CollectionError::Criteria(e) => e.into(),
        }
    }
}
