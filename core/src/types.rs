//! Wire DTOs for the Sky Island function API.
//!
//! # Design
//! `FunctionCall` is the only thing the client ever sends. Field order in the
//! struct is the key order on the wire, and nothing else is serialized.
//! `CallResult` stores the response as a canonical JSON string rather than a
//! `Value` so it can be handed across the C boundary unchanged.

use serde::{Deserialize, Serialize};

/// Request envelope posted to the function endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    pub url: String,
    pub call: String,
}

impl FunctionCall {
    pub fn new(url: &str, call: &str) -> Self {
        Self {
            url: url.to_string(),
            call: call.to_string(),
        }
    }
}

/// A successfully parsed response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallResult {
    /// Seconds since the Unix epoch, taken when the body was parsed.
    pub timestamp: i64,
    /// The response body re-serialized in compact form.
    pub data: String,
}

impl CallResult {
    /// Decode `data` back into a JSON value.
    pub fn value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.data)
    }

    /// The service's own `data` string, when the body has the
    /// `{"timestamp": .., "data": "..."}` shape the function endpoint returns.
    pub fn output(&self) -> Option<String> {
        let value = self.value().ok()?;
        value.get("data")?.as_str().map(str::to_string)
    }
}
