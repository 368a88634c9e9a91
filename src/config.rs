//! Client configuration

use crate::error::Error;
use std::str::FromStr;
use uuid::Uuid;

/// Default base URL for the chat v1 API
pub const DEFAULT_BASE_URL: &str = "https://api.on-demand.io/chat/v1";

/// Default endpoint identifier used for queries
pub const DEFAULT_ENDPOINT_ID: &str = "predefined-openai-gpt4o";

/// Default reasoning mode used for queries
pub const DEFAULT_REASONING_MODE: &str = "medium";

/// How the query endpoint should deliver its response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// A single JSON document in one response
    Sync,
    /// An event stream of `data:`-prefixed frames
    Stream,
}

impl ResponseMode {
    /// The wire value sent in the query body
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Sync => "sync",
            ResponseMode::Stream => "stream",
        }
    }
}

impl FromStr for ResponseMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(ResponseMode::Sync),
            "stream" => Ok(ResponseMode::Stream),
            other => Err(Error::Configuration(format!(
                "Unknown response mode '{}' (expected 'sync' or 'stream')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for the OnDemand client
///
/// Immutable once handed to a [`Client`](crate::Client); construct it at
/// process start and pass it in.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent in the `apikey` header on every request
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Caller identity; generated randomly when not supplied
    pub external_user_id: String,
    /// Agent identifiers attached to sessions and queries
    pub agent_ids: Vec<String>,
    /// Endpoint identifier for queries
    pub endpoint_id: String,
    /// Reasoning mode for queries
    pub reasoning_mode: String,
}

impl ClientConfig {
    /// Create a new configuration with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            external_user_id: Uuid::new_v4().to_string(),
            agent_ids: Vec::new(),
            endpoint_id: DEFAULT_ENDPOINT_ID.to_string(),
            reasoning_mode: DEFAULT_REASONING_MODE.to_string(),
        }
    }

    /// Set a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the external user identifier
    pub fn with_external_user_id(mut self, id: impl Into<String>) -> Self {
        self.external_user_id = id.into();
        self
    }

    /// Set the agent identifiers
    pub fn with_agent_ids(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.agent_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the endpoint identifier
    pub fn with_endpoint_id(mut self, id: impl Into<String>) -> Self {
        self.endpoint_id = id.into();
        self
    }

    /// Set the reasoning mode
    pub fn with_reasoning_mode(mut self, mode: impl Into<String>) -> Self {
        self.reasoning_mode = mode.into();
        self
    }

    /// Get the URL for session creation
    pub fn sessions_url(&self) -> String {
        format!("{}/sessions", self.base_url)
    }

    /// Get the URL for submitting a query against a session
    pub fn query_url(&self, session_id: &str) -> String {
        format!("{}/sessions/{}/query", self.base_url, session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("test-key");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.endpoint_id, DEFAULT_ENDPOINT_ID);
        assert_eq!(config.reasoning_mode, DEFAULT_REASONING_MODE);
        assert!(config.agent_ids.is_empty());
    }

    #[test]
    fn test_generated_external_user_id() {
        let a = ClientConfig::new("k");
        let b = ClientConfig::new("k");
        assert!(!a.external_user_id.is_empty());
        assert_ne!(a.external_user_id, b.external_user_id);
    }

    #[test]
    fn test_config_urls() {
        let config = ClientConfig::new("k").with_base_url("http://localhost:8080/chat/v1");
        assert_eq!(config.sessions_url(), "http://localhost:8080/chat/v1/sessions");
        assert_eq!(
            config.query_url("sess-1"),
            "http://localhost:8080/chat/v1/sessions/sess-1/query"
        );
    }

    #[test]
    fn test_config_builders() {
        let config = ClientConfig::new("k")
            .with_external_user_id("user-1")
            .with_agent_ids(vec!["agent-1", "agent-2"])
            .with_endpoint_id("custom-endpoint")
            .with_reasoning_mode("high");

        assert_eq!(config.external_user_id, "user-1");
        assert_eq!(config.agent_ids, vec!["agent-1", "agent-2"]);
        assert_eq!(config.endpoint_id, "custom-endpoint");
        assert_eq!(config.reasoning_mode, "high");
    }

    #[test]
    fn test_response_mode_parsing() {
        assert_eq!("sync".parse::<ResponseMode>().unwrap(), ResponseMode::Sync);
        assert_eq!(
            "stream".parse::<ResponseMode>().unwrap(),
            ResponseMode::Stream
        );
        assert!("".parse::<ResponseMode>().is_err());
        assert!("batch".parse::<ResponseMode>().is_err());
    }

    #[test]
    fn test_response_mode_display() {
        assert_eq!(ResponseMode::Sync.to_string(), "sync");
        assert_eq!(ResponseMode::Stream.to_string(), "stream");
    }
}
