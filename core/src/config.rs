//! Client configuration.
//!
//! # Design
//! One struct replaces separate "basic" and "verify-skipping" clients: TLS
//! verification stays on unless a flag is set explicitly. The config is
//! immutable once handed to a client, and serde support lets embedders load
//! it from a JSON document. Timeout is a constant, not a setting.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CallError;

/// Total time budget for one exchange, connect through last body byte.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// User agent sent when the config does not override it.
pub const DEFAULT_USER_AGENT: &str = "sky-island/1.0";

const FUNCTION_PATH: &str = "/api/v1/function";

/// Where and how to reach a Sky Island service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Absolute URL every call is POSTed to.
    pub endpoint: String,
    /// Skip TLS hostname verification.
    #[serde(default)]
    pub skip_host_verify: bool,
    /// Skip TLS certificate chain verification.
    #[serde(default)]
    pub skip_peer_verify: bool,
    /// Extra headers appended to every request, e.g. credentials.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ClientConfig {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            skip_host_verify: false,
            skip_peer_verify: false,
            headers: Vec::new(),
            user_agent: default_user_agent(),
        }
    }

    /// Config for the conventional `{host}:{port}/api/v1/function` endpoint.
    /// A bare host is assumed to be plain `http`.
    pub fn for_host(host: &str, port: u16) -> Self {
        let host = host.trim_end_matches('/');
        let endpoint = if host.contains("://") {
            format!("{host}:{port}{FUNCTION_PATH}")
        } else {
            format!("http://{host}:{port}{FUNCTION_PATH}")
        };
        Self::new(&endpoint)
    }

    pub fn skip_host_verify(mut self, skip: bool) -> Self {
        self.skip_host_verify = skip;
        self
    }

    pub fn skip_peer_verify(mut self, skip: bool) -> Self {
        self.skip_peer_verify = skip;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// True when either TLS check has been switched off.
    pub fn skips_verification(&self) -> bool {
        self.skip_host_verify || self.skip_peer_verify
    }

    /// Reject configs that could never produce a request.
    pub fn validate(&self) -> Result<(), CallError> {
        if self.endpoint.is_empty() {
            return Err(CallError::Initialization("endpoint is empty".to_string()));
        }
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| CallError::Initialization(format!("invalid endpoint {}: {e}", self.endpoint)))?;
        match url.scheme() {
            "http" | "https" => {}
            _ => {
                return Err(CallError::Initialization(format!(
                    "endpoint {} must be an absolute http(s) URL",
                    self.endpoint
                )))
            }
        }
        if url.host_str().is_none() {
            return Err(CallError::Initialization(format!(
                "endpoint {} has no host",
                self.endpoint
            )));
        }
        for (name, value) in &self.headers {
            if name.is_empty() || value.is_empty() {
                return Err(CallError::Initialization(format!(
                    "header {name:?} must have a name and a value"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_is_on_by_default() {
        let config = ClientConfig::new("https://sky.example/api/v1/function");
        assert!(!config.skip_host_verify);
        assert!(!config.skip_peer_verify);
        assert!(!config.skips_verification());
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn for_host_builds_function_endpoint() {
        assert_eq!(
            ClientConfig::for_host("localhost", 3280).endpoint,
            "http://localhost:3280/api/v1/function"
        );
        assert_eq!(
            ClientConfig::for_host("https://sky.example/", 443).endpoint,
            "https://sky.example:443/api/v1/function"
        );
    }

    #[test]
    fn validate_accepts_absolute_urls() {
        assert!(ClientConfig::new("http://127.0.0.1:3000/api/v1/function").validate().is_ok());
        assert!(ClientConfig::new("https://sky.example").validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_endpoints() {
        for endpoint in ["", "not a url", "/api/v1/function", "ftp://sky.example/x"] {
            let err = ClientConfig::new(endpoint).validate().unwrap_err();
            assert!(matches!(err, CallError::Initialization(_)), "{endpoint:?}");
        }
    }

    #[test]
    fn validate_rejects_empty_header() {
        let config = ClientConfig::new("http://localhost").header("Authorization", "");
        assert!(matches!(config.validate(), Err(CallError::Initialization(_))));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"endpoint":"https://sky.example","skip_peer_verify":true}"#).unwrap();
        assert_eq!(config.endpoint, "https://sky.example");
        assert!(config.skip_peer_verify);
        assert!(!config.skip_host_verify);
        assert!(config.headers.is_empty());
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn builder_appends_headers_in_order() {
        let config = ClientConfig::new("http://localhost")
            .header("X-Api-Key", "k1")
            .header("X-Tenant", "t1");
        assert_eq!(
            config.headers,
            vec![
                ("X-Api-Key".to_string(), "k1".to_string()),
                ("X-Tenant".to_string(), "t1".to_string()),
            ]
        );
    }
}
