//! Error types for activa-core

use crate::validation::ValidationErrors;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown ecosystem: {0}")]
    UnknownEcosystem(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
