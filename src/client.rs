//! The OnDemand chat client
//!
//! Two sequential operations against the service: open a session, then
//! submit a query against it. The session identifier returned by
//! [`Client::create_session`] feeds [`Client::submit_query`]; neither call
//! retries on failure.

use crate::config::{ClientConfig, ResponseMode};
use crate::converter;
use crate::error::Result;
use crate::http::{create_headers, HttpClient, ReqwestClient};
use crate::parser;
use crate::stream::QueryStream;
use crate::types::{ContextField, QueryRequest};
use serde_json::Value;
use std::sync::Arc;

/// Client for the OnDemand chat v1 API
///
/// # Example
///
/// ```no_run
/// use ondemand::{Client, ClientConfig, ContextField, QueryRequest, ResponseMode};
///
/// # async fn example() -> ondemand::Result<()> {
/// let config = ClientConfig::new("your-api-key")
///     .with_agent_ids(vec!["agent-1712327325"]);
/// let client = Client::with_config(config)?;
///
/// let metadata = vec![ContextField::new("userId", "1")];
/// let session_id = client.create_session(&metadata).await?;
///
/// let request = QueryRequest::builder()
///     .query("What is Rust?")
///     .response_mode(ResponseMode::Stream)
///     .try_build()
///     .expect("valid request");
///
/// let result = client.submit_query(&session_id, &request, &metadata).await?;
/// println!("{}", serde_json::to_string_pretty(&result).unwrap());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    http: Arc<dyn HttpClient>,
    config: ClientConfig,
}

impl Client {
    /// Create a new client with the given configuration and HTTP client
    pub fn new(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { http, config }
    }

    /// Create a new client with the default HTTP client
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = Arc::new(ReqwestClient::new()?);
        Ok(Self::new(config, http))
    }

    /// Create a new client with just an API key
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a chat session and return its identifier
    ///
    /// The caller-supplied metadata is attached to the session; any entries
    /// the server echoes back are logged. A non-success status is fatal for
    /// the run and yields no identifier.
    pub async fn create_session(&self, metadata: &[ContextField]) -> Result<String> {
        let url = self.config.sessions_url();
        let body = converter::session_body(&self.config, metadata)?;
        let headers = create_headers(&self.config.api_key)?;

        tracing::debug!(%url, "creating chat session");
        let response = self.http.post(&url, headers, body).await?;

        let (session_id, echoed) = parser::parse_session_response(response)?;
        tracing::info!(%session_id, "chat session created");
        for field in &echoed {
            tracing::info!(key = %field.key, value = %field.value, "context metadata");
        }

        Ok(session_id)
    }

    /// Submit a query in sync mode and return the response document
    ///
    /// The caller-supplied context metadata is injected into the document's
    /// `data` section; everything else is returned verbatim.
    pub async fn query_sync(
        &self,
        session_id: &str,
        request: &QueryRequest,
        metadata: &[ContextField],
    ) -> Result<Value> {
        let url = self.config.query_url(session_id);
        let body = converter::query_body(&self.config, request);
        let headers = create_headers(&self.config.api_key)?;

        tracing::debug!(%url, "submitting sync query");
        let mut response = self.http.post(&url, headers, body).await?;

        if let Some(data) = response.get_mut("data").and_then(Value::as_object_mut) {
            data.insert("contextMetadata".to_string(), serde_json::to_value(metadata)?);
        }

        Ok(response)
    }

    /// Submit a query in stream mode and return the event stream
    pub async fn query_stream(
        &self,
        session_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryStream> {
        let url = self.config.query_url(session_id);
        let body = converter::query_body(&self.config, request);
        let headers = create_headers(&self.config.api_key)?;

        tracing::debug!(%url, "submitting streaming query");
        let stream = self.http.post_stream(&url, headers, body).await?;

        Ok(QueryStream::new(stream))
    }

    /// Submit a query, forking on the request's response mode
    ///
    /// Sync mode returns the response document with the metadata injected;
    /// stream mode drains the event stream and returns the assembled final
    /// record.
    pub async fn submit_query(
        &self,
        session_id: &str,
        request: &QueryRequest,
        metadata: &[ContextField],
    ) -> Result<Value> {
        match request.response_mode {
            ResponseMode::Sync => self.query_sync(session_id, request, metadata).await,
            ResponseMode::Stream => {
                let stream = self.query_stream(session_id, request).await?;
                let outcome = stream.collect_outcome(metadata.to_vec()).await?;
                if outcome.skipped_frames() > 0 {
                    tracing::warn!(
                        skipped = outcome.skipped_frames(),
                        "stream contained malformed frames"
                    );
                }
                Ok(outcome.into_value())
            }
        }
    }
}
