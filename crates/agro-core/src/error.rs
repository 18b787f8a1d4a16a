//! Error types for AgroCast

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the AgroCast client
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The request never completed (unreachable host, timeout, broken body).
    #[error("Network error: {0}")]
    Transport(String),

    /// The prediction service answered with an error or an unexpected shape.
    /// The message is shown to the user verbatim.
    #[error("{message}")]
    Service {
        status: Option<u16>,
        message: String,
    },

    #[error("Geolocation is not supported on this device")]
    GeolocationUnavailable,

    #[error("Unable to retrieve your location: {0}")]
    GeolocationDenied(String),

    #[error("Weather lookup failed: {0}")]
    EnrichmentDegraded(String),

    #[error("No prediction available yet")]
    NoResult,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn service(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Service {
            status,
            message: message.into(),
        }
    }

    /// Advisory conditions never discard data the caller already holds.
    pub fn is_advisory(&self) -> bool {
        matches!(
            self,
            Error::EnrichmentDegraded(_) | Error::GeolocationUnavailable | Error::GeolocationDenied(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
