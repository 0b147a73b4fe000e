//! Synchronous client core for the Sky Island function API.
//!
//! # Overview
//! Sends a `{"url": ..., "call": ...}` envelope to a Sky Island endpoint with
//! a single blocking POST, waits at most [`CALL_TIMEOUT`], and returns the
//! decoded JSON body stamped with the time it was parsed.
//!
//! # Design
//! - `SkyIslandClient` holds only an immutable `ClientConfig` and a transport,
//!   so one client may be shared across threads without locking.
//! - Each call is split into `build_request` (produces plain data) and
//!   `parse_response` (consumes plain data). The `Transport` trait sits
//!   between them, which keeps both halves testable without a network.
//! - `BlockingTransport` is the default transport. Redirects are never
//!   followed and HTTP statuses come back as data for `parse_response` to
//!   interpret. Hostname and certificate-chain checks can be relaxed
//!   independently.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::{call, SkyIslandClient};
pub use config::{ClientConfig, CALL_TIMEOUT, DEFAULT_USER_AGENT};
pub use error::CallError;
pub use http::{BlockingTransport, HttpRequest, HttpResponse, Transport, TransportFailure, TransportOptions};
pub use types::{CallResult, FunctionCall};
