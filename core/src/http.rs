//! HTTP transport seam.
//!
//! # Design
//! Requests and responses are plain data. `SkyIslandClient` builds an
//! `HttpRequest`, hands it to a `Transport`, and parses the `HttpResponse`
//! that comes back. The transport owns connection setup, TLS and the timeout;
//! it never interprets status codes or bodies.
//!
//! `BlockingTransport` is the production transport. Its client returns any
//! status, including 3xx, as a response: redirects are not followed and
//! 4xx/5xx are not turned into errors. Bodies are read in full, with no size
//! cap, before parsing.

use std::time::Duration;

use crate::config::{ClientConfig, CALL_TIMEOUT};
use crate::error::CallError;

/// A POST request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// A response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Connection settings a transport is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub timeout: Duration,
    pub skip_host_verify: bool,
    pub skip_peer_verify: bool,
}

impl From<&ClientConfig> for TransportOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            timeout: CALL_TIMEOUT,
            skip_host_verify: config.skip_host_verify,
            skip_peer_verify: config.skip_peer_verify,
        }
    }
}

/// Why the exchange produced no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub message: String,
    pub timed_out: bool,
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        let timed_out = err.is_timeout();
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        Self { message, timed_out }
    }
}

/// Executes one POST and returns whatever the server answered.
///
/// Implementations must be safe to call from several threads at once.
pub trait Transport: Send + Sync {
    fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

/// `Transport` backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct BlockingTransport {
    client: reqwest::blocking::Client,
}

impl BlockingTransport {
    /// Build the client. Fails with `Initialization` if the TLS backend
    /// cannot be set up.
    pub fn new(options: &TransportOptions) -> Result<Self, CallError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(options.skip_peer_verify)
            .danger_accept_invalid_hostnames(options.skip_host_verify)
            .build()
            .map_err(|e| CallError::Initialization(format!("failed to build http client: {e}")))?;

        Ok(Self { client })
    }
}

impl Transport for BlockingTransport {
    fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body.clone()).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();

        Ok(HttpResponse { status, body })
    }
}
