//! Request builder, response parser and the blocking `call` operation.
//!
//! # Design
//! `SkyIslandClient` holds a validated config and a transport and nothing
//! else, so `call` can run from many threads at once. A call moves through
//! `build_request`, `Transport::post_json` and `parse_response`; every value
//! in between is owned by the call and dropped on every exit path.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::CallError;
use crate::http::{BlockingTransport, HttpRequest, HttpResponse, Transport, TransportOptions};
use crate::types::{CallResult, FunctionCall};

/// Blocking client for a single Sky Island endpoint.
#[derive(Debug, Clone)]
pub struct SkyIslandClient<T = BlockingTransport> {
    config: ClientConfig,
    transport: T,
}

impl SkyIslandClient<BlockingTransport> {
    /// Validate `config` and build the default blocking transport for it.
    pub fn new(config: ClientConfig) -> Result<Self, CallError> {
        config.validate()?;
        if config.skips_verification() {
            warn!(
                skip_host_verify = config.skip_host_verify,
                skip_peer_verify = config.skip_peer_verify,
                "TLS verification relaxed for {}",
                config.endpoint
            );
        }
        let transport = BlockingTransport::new(&TransportOptions::from(&config))?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> SkyIslandClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, CallError> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_request(&self, url: &str, call: &str) -> Result<HttpRequest, CallError> {
        if url.is_empty() {
            return Err(CallError::InvalidArgument("url"));
        }
        if call.is_empty() {
            return Err(CallError::InvalidArgument("call"));
        }

        let body = serde_json::to_vec(&FunctionCall::new(url, call))
            .map_err(|e| CallError::Serialization(e.to_string()))?;

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
        ];
        headers.extend(self.config.headers.iter().cloned());

        Ok(HttpRequest {
            url: self.config.endpoint.clone(),
            headers,
            body,
        })
    }

    /// Turn a raw response into a `CallResult`. `url` is the call's target,
    /// used only for error reporting.
    pub fn parse_response(&self, url: &str, response: HttpResponse) -> Result<CallResult, CallError> {
        if response.body.is_empty() {
            return Err(CallError::Transport {
                url: url.to_string(),
                message: format!("empty response body (HTTP {})", response.status),
            });
        }
        if response.status >= 400 {
            return Err(CallError::HttpStatus {
                status: response.status,
                message: status_message(&response.body),
            });
        }

        let value: serde_json::Value = serde_json::from_slice(&response.body)
            .map_err(|e| CallError::MalformedResponse(format!("failed to parse json: {e}")))?;
        let data = serde_json::to_string(&value).map_err(|e| CallError::Serialization(e.to_string()))?;

        Ok(CallResult {
            timestamp: unix_now(),
            data,
        })
    }

    /// POST `{"url": url, "call": call}` to the endpoint and parse the reply.
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    pub fn call(&self, url: &str, call: &str) -> Result<CallResult, CallError> {
        let request = self.build_request(url, call)?;
        debug!(bytes = request.body.len(), "sending function call");

        let response = self.transport.post_json(&request).map_err(|failure| {
            warn!(timed_out = failure.timed_out, "transport failed: {}", failure.message);
            CallError::Transport {
                url: url.to_string(),
                message: failure.message,
            }
        })?;
        debug!(status = response.status, bytes = response.body.len(), "received response");

        self.parse_response(url, response).inspect_err(|e| warn!("call failed: {e}"))
    }
}

/// One-shot call with a transport created for this invocation only.
pub fn call(config: &ClientConfig, url: &str, call_name: &str) -> Result<CallResult, CallError> {
    SkyIslandClient::new(config.clone())?.call(url, call_name)
}

/// Prefer the service's `{"error": "..."}` text, fall back to the raw body.
fn status_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
