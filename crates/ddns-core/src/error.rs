//! Error types for the DDNS updater
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Address collection errors (bus connection, device enumeration)
    #[error("Address collector error: {0}")]
    Collector(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// HTTP transport errors (request never produced a response body)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered, but not with the success marker
    #[error("Unexpected response for {hostname}: {body:?}")]
    UnexpectedResponse {
        /// Hostname the update was issued for
        hostname: String,
        /// Raw response body
        body: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an address collector error
    pub fn collector(msg: impl Into<String>) -> Self {
        Self::Collector(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an unexpected-response error
    pub fn unexpected_response(hostname: impl Into<String>, body: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            hostname: hostname.into(),
            body: body.into(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
