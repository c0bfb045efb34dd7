//! Error types for the integration client.
//!
//! # Design
//! Every failure is returned to the caller as-is; the client never retries or
//! logs errors. Any status other than 200 lands in `Remote` with the raw body
//! preserved for diagnostics, whatever that body contains.

use std::error::Error as StdError;

use thiserror::Error;

use crate::date::DateFormatError;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `IntegrationClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL could not be turned into endpoint URLs.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a status other than 200.
    #[error("HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The response body did not match the expected structure.
    #[error("decoding response failed: {0}")]
    Decode(String),

    #[error(transparent)]
    DateFormat(#[from] DateFormatError),

    /// A listed order had no reference and the client is configured to
    /// reject such responses.
    #[error("order at position {index} has no reference")]
    MissingReference { index: usize },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The caller's cancel signal fired before the response arrived.
    #[error("request cancelled")]
    Cancelled,
}

/// A network-level failure reported by an `HttpTransport`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::with_source(err.to_string(), err)
    }
}
