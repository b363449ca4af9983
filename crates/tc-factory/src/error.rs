use tc_collection::CollectionError;
use tc_core::CoreError;
use tc_criteria::CriteriaError;
use tc_models::ModelError;
use thiserror::Error;

pub type FactoryResult<T> = Result<T, FactoryError>;

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Missing weather variable: {what}")]
    MissingInput { what: String },

    #[error("Invalid weather data: {what}")]
    InvalidWeather { what: String },

    #[error("Invalid factory config: {what}")]
    InvalidConfig { what: String },

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<FactoryError> for CoreError {
    fn from(err: FactoryError) -> Self {
        match err {
            FactoryError::MissingInput { .. } => CoreError::InvalidArg {
                what: "missing weather variable",
            },
            FactoryError::InvalidWeather { .. } => CoreError::InvalidArg {
                what: "invalid weather data",
            },
            FactoryError::InvalidConfig { .. } => CoreError::InvalidArg {
                what: "invalid factory config",
            },
            FactoryError::Collection(e) => e.into(),
            FactoryError::Criteria(e) => e.into(),
            FactoryError::Model(e) => e.into(),
            FactoryError::Core(e) => e,
            FactoryError::Io(_) | FactoryError::Yaml(_) | FactoryError::Json(_) => {
                CoreError::InvalidArg {
                    what: "unreadable factory input",
                }
            }
        }
    }
}
