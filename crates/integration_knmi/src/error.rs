//! KNMI client error types

use thiserror::Error;

/// Errors returned by the KNMI client
///
/// The four read operations only ever produce [`KnmiError::InvalidApiKey`],
/// [`KnmiError::RequestError`] or [`KnmiError::ResultError`].
/// [`KnmiError::Configuration`] is reserved for client construction.
#[derive(Debug, Error)]
pub enum KnmiError {
    /// The API key was rejected (HTTP 401/403 or an embedded error marker)
    #[error("Your API key is invalid or does not support this operation")]
    InvalidApiKey,

    /// Timeout, transport failure or unexpected HTTP status
    #[error("Request error: {0}")]
    RequestError(String),

    /// The provider answered, but the payload has an unexpected shape
    #[error("Result error: {0}")]
    ResultError(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl KnmiError {
    /// Returns true if repeating the same call may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RequestError(_))
    }
}
