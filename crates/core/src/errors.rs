use thiserror::Error;

use crate::providers::ProviderError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("catalog snapshot is empty; every line would fail to map")]
    EmptyCatalog,
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("data source failure: {0}")]
    DataSource(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<ProviderError> for ApplicationError {
    fn from(value: ProviderError) -> Self {
        Self::DataSource(value.to_string())
    }
}
