//! Error types for the foo core library
//!
//! Every operation of the core reports failure through [`Error`]. Foreign
//! failures raised inside a callback implementation travel as an
//! [`anyhow::Error`] so that a binding can downcast them back to its own
//! native error type before handing them to the caller.

use thiserror::Error;

use crate::handle::Method;

/// Main error type for foo operations
#[derive(Error, Debug)]
pub enum Error {
    /// A value outside the representable domain during codec conversion
    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    /// A trigger operation ran while no callback was registered
    #[error("No callback registered")]
    NoCallbackRegistered,

    /// An operation was issued on a callback source after it was destroyed
    #[error("Object destroyed: {operation} called after destroy")]
    ObjectDestroyed { operation: &'static str },

    /// A mutating operation was issued while the source was calling out
    #[error("Reentrant call: {operation} is not allowed from inside a callback")]
    Reentrant { operation: &'static str },

    /// The foreign implementation failed while handling a dispatch
    #[error("Callback '{method}' failed: {source}")]
    Callback {
        method: Method,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an [`Error::InvalidValue`]
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Error::InvalidValue {
            message: message.into(),
        }
    }

    /// Build an [`Error::Configuration`] without a source
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Stable short name of the error kind, used by bindings and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidValue { .. } => "InvalidValue",
            Error::NoCallbackRegistered => "NoCallbackRegistered",
            Error::ObjectDestroyed { .. } => "ObjectDestroyed",
            Error::Reentrant { .. } => "Reentrant",
            Error::Callback { .. } => "Callback",
            Error::Configuration { .. } => "Configuration",
        }
    }
}
