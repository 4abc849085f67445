//! Error types for the instrument locator.
//!
//! Store and lookup failures have their own enums next to the code that
//! raises them; this module wraps them for the configuration and CLI layers.

use thiserror::Error;

use crate::{core::store::StoreError, image::LookupError, runtime::handle::RuntimeError};

/// The main error type for application-level operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// A store operation was rejected, directly or through a session.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The session runtime stopped answering.
    #[error("session error: {0}")]
    Runtime(RuntimeError),

    /// The image lookup client could not be built.
    #[error("image lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for application-level operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::Store(rejection) => Self::Store(rejection),
            other => Self::Runtime(other),
        }
    }
}

impl Error {
    /// Check if this error is a user-correctable store rejection.
    #[must_use]
    pub fn is_store_rejection(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
