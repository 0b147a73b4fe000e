//! Error types for the Sky Island client.
//!
//! # Design
//! Every failure is returned to the caller as a `CallError`; nothing is
//! retried at this layer. `Transport` covers everything that went wrong before
//! a usable body arrived (including an empty body), while `MalformedResponse`
//! means bytes arrived but were not JSON. Statuses of 400 and above get their
//! own variant so callers can tell a rejected call from a broken network.

use thiserror::Error;

/// Errors returned by `SkyIslandClient` and the free `call` function.
#[derive(Debug, Error)]
pub enum CallError {
    /// The configuration was unusable or the transport could not be created.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// A required argument was empty.
    #[error("invalid argument: {0} must not be empty")]
    InvalidArgument(&'static str),

    /// The request envelope could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The exchange failed (connect, TLS, timeout) or returned an empty body.
    #[error("failed to fetch url ({url}): {message}")]
    Transport { url: String, message: String },

    /// The service answered with a 4xx or 5xx status.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The response body was not valid JSON.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl CallError {
    /// True for failures that happened on the wire rather than in the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, CallError::Transport { .. })
    }
}
