//! Error types for database operations.

use activa_core::ValidationErrors;
use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Field-level problems with a write. Never retried.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Deletion of a record that can never be deleted.
    #[error("Protected record: {0}")]
    Protected(ValidationErrors),

    /// Referenced record is missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected a row a concurrent writer created first.
    ///
    /// Absorbed by [`Store`](crate::Store) retrying the unit of work; callers
    /// do not see it.
    #[error("Uniqueness race: {0}")]
    UniquenessRace(String),

    /// Native DB error.
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Core error.
    #[error("Core error: {0}")]
    Core(activa_core::Error),
}

impl Error {
    /// The field/base messages of a rejected write or delete.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Error::Validation(errors) | Error::Protected(errors) => Some(errors),
            Error::Core(activa_core::Error::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Error::Protected(_))
    }
}

impl From<activa_core::Error> for Error {
    fn from(err: activa_core::Error) -> Self {
        match err {
            activa_core::Error::Validation(errors) => Error::Validation(errors),
            other => Error::Core(other),
        }
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        if matches!(err, native_db::db_type::Error::DuplicateKey { .. }) {
            Error::UniquenessRace(err.to_string())
        } else {
            Error::Database(err.to_string())
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;
