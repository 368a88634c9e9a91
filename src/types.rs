//! Request, event, and result types

use crate::config::ResponseMode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// A caller-supplied key/value metadata pair attached to a session
/// and echoed back in results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextField {
    /// Metadata key
    pub key: String,
    /// Metadata value
    pub value: String,
}

impl ContextField {
    /// Create a new metadata pair
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Model configuration sent with every query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelConfigs {
    /// Fulfillment prompt override
    pub fulfillment_prompt: Option<String>,
    /// Stop sequences
    pub stop_sequences: Vec<String>,
    /// Temperature for randomness
    pub temperature: Option<f64>,
    /// Top-p nucleus sampling
    pub top_p: Option<f64>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Presence penalty
    pub presence_penalty: Option<f64>,
    /// Frequency penalty
    pub frequency_penalty: Option<f64>,
}

impl ModelConfigs {
    /// Create a new model configuration builder
    pub fn builder() -> ModelConfigsBuilder {
        ModelConfigsBuilder::default()
    }
}

/// Builder for [`ModelConfigs`]
#[derive(Default)]
pub struct ModelConfigsBuilder {
    configs: ModelConfigs,
}

impl ModelConfigsBuilder {
    /// Set the fulfillment prompt
    pub fn fulfillment_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.configs.fulfillment_prompt = Some(prompt.into());
        self
    }

    /// Set stop sequences
    pub fn stop_sequences(mut self, sequences: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.configs.stop_sequences = sequences.into_iter().map(Into::into).collect();
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temp: f64) -> Self {
        self.configs.temperature = Some(temp);
        self
    }

    /// Set top-p
    pub fn top_p(mut self, p: f64) -> Self {
        self.configs.top_p = Some(p);
        self
    }

    /// Set maximum tokens
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.configs.max_tokens = Some(tokens);
        self
    }

    /// Set presence penalty
    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.configs.presence_penalty = Some(penalty);
        self
    }

    /// Set frequency penalty
    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.configs.frequency_penalty = Some(penalty);
        self
    }

    /// Build the model configuration
    pub fn build(self) -> ModelConfigs {
        self.configs
    }
}

/// A query to submit against an open session
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Free-text query string
    pub query: String,
    /// How the response should be delivered
    pub response_mode: ResponseMode,
    /// Model configuration
    pub model_configs: ModelConfigs,
}

impl QueryRequest {
    /// Create a new query request builder
    pub fn builder() -> QueryRequestBuilder {
        QueryRequestBuilder::default()
    }
}

/// Builder for [`QueryRequest`]
#[derive(Default)]
pub struct QueryRequestBuilder {
    query: Option<String>,
    response_mode: Option<ResponseMode>,
    model_configs: ModelConfigs,
}

impl QueryRequestBuilder {
    /// Set the query text
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set the response mode
    pub fn response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = Some(mode);
        self
    }

    /// Set the model configuration
    pub fn model_configs(mut self, configs: ModelConfigs) -> Self {
        self.model_configs = configs;
        self
    }

    /// Build the request, validating required fields
    pub fn try_build(self) -> Result<QueryRequest, BuildError> {
        let query = self.query.filter(|q| !q.is_empty()).ok_or(BuildError::EmptyQuery)?;
        let response_mode = self.response_mode.ok_or(BuildError::NoResponseMode)?;

        Ok(QueryRequest {
            query,
            response_mode,
            model_configs: self.model_configs,
        })
    }
}

/// Errors that can occur when building a query request
#[derive(Debug, Error)]
pub enum BuildError {
    /// Request must contain a non-empty query
    #[error("Request must contain a non-empty query")]
    EmptyQuery,
    /// Request must specify a response mode
    #[error("Request must specify a response mode")]
    NoResponseMode,
}

/// Events that can occur while consuming a streamed query response
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An incremental fragment of the answer
    Fulfillment {
        /// Answer fragment, if present
        answer: Option<String>,
        /// Session identifier, if present
        session_id: Option<String>,
        /// Message identifier, if present
        message_id: Option<String>,
    },
    /// A metrics snapshot superseding any prior one
    Metrics {
        /// The `publicMetrics` payload
        public_metrics: Map<String, Value>,
    },
    /// Stream has ended
    Done,
}

/// Accumulates streamed events into the final query result
#[derive(Debug, Default)]
pub struct QueryOutcome {
    answer: String,
    session_id: String,
    message_id: String,
    metrics: Map<String, Value>,
    context_metadata: Vec<ContextField>,
    skipped_frames: u64,
}

impl QueryOutcome {
    /// Create an accumulator echoing the given context metadata
    pub fn new(context_metadata: Vec<ContextField>) -> Self {
        Self {
            context_metadata,
            ..Self::default()
        }
    }

    /// Process a stream event
    ///
    /// Fulfillment fragments are appended in arrival order; identifiers use
    /// last-writer-wins, with absent fields leaving the prior value
    /// unchanged. Metrics snapshots replace the previous one outright.
    pub fn process_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Fulfillment {
                answer,
                session_id,
                message_id,
            } => {
                if let Some(fragment) = answer {
                    self.answer.push_str(&fragment);
                }
                if let Some(id) = session_id {
                    self.session_id = id;
                }
                if let Some(id) = message_id {
                    self.message_id = id;
                }
            }
            StreamEvent::Metrics { public_metrics } => {
                self.metrics = public_metrics;
            }
            StreamEvent::Done => {}
        }
    }

    /// Record one skipped malformed frame
    pub fn record_skipped(&mut self) {
        self.skipped_frames += 1;
    }

    /// Set the skipped-frame count observed by the stream consumer
    pub fn set_skipped_frames(&mut self, count: u64) {
        self.skipped_frames = count;
    }

    /// The accumulated answer text
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// The final session identifier, empty if never reported
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The final message identifier, empty if never reported
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// The last metrics snapshot, empty if none occurred
    pub fn metrics(&self) -> &Map<String, Value> {
        &self.metrics
    }

    /// Number of malformed frames that were skipped
    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    /// Assemble the final response record
    pub fn into_value(self) -> Value {
        json!({
            "message": "Chat query submitted successfully",
            "data": {
                "sessionId": self.session_id,
                "messageId": self.message_id,
                "answer": self.answer,
                "metrics": self.metrics,
                "status": "completed",
                "contextMetadata": self.context_metadata,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_model_configs_builder() {
        let configs = ModelConfigs::builder()
            .temperature(0.7)
            .top_p(1.0)
            .max_tokens(100)
            .stop_sequences(vec!["END"])
            .presence_penalty(0.5)
            .frequency_penalty(-0.5)
            .fulfillment_prompt("Answer briefly")
            .build();

        assert_eq!(configs.temperature, Some(0.7));
        assert_eq!(configs.top_p, Some(1.0));
        assert_eq!(configs.max_tokens, Some(100));
        assert_eq!(configs.stop_sequences, vec!["END".to_string()]);
        assert_eq!(configs.presence_penalty, Some(0.5));
        assert_eq!(configs.frequency_penalty, Some(-0.5));
        assert_eq!(configs.fulfillment_prompt.as_deref(), Some("Answer briefly"));
    }

    #[test]
    fn test_query_request_builder() {
        let request = QueryRequest::builder()
            .query("What is Rust?")
            .response_mode(ResponseMode::Sync)
            .try_build()
            .unwrap();

        assert_eq!(request.query, "What is Rust?");
        assert_eq!(request.response_mode, ResponseMode::Sync);
        assert_eq!(request.model_configs, ModelConfigs::default());
    }

    #[test]
    fn test_query_request_builder_empty_query() {
        let result = QueryRequest::builder()
            .query("")
            .response_mode(ResponseMode::Sync)
            .try_build();
        assert!(matches!(result, Err(BuildError::EmptyQuery)));

        let result = QueryRequest::builder()
            .response_mode(ResponseMode::Sync)
            .try_build();
        assert!(matches!(result, Err(BuildError::EmptyQuery)));
    }

    #[test]
    fn test_query_request_builder_no_mode() {
        let result = QueryRequest::builder().query("hello").try_build();
        assert!(matches!(result, Err(BuildError::NoResponseMode)));
    }

    #[test]
    fn test_outcome_accumulates_fragments_in_order() {
        let mut outcome = QueryOutcome::default();
        outcome.process_event(StreamEvent::Fulfillment {
            answer: Some("Hel".into()),
            session_id: None,
            message_id: None,
        });
        outcome.process_event(StreamEvent::Fulfillment {
            answer: Some("lo".into()),
            session_id: None,
            message_id: None,
        });

        assert_eq!(outcome.answer(), "Hello");
    }

    #[test]
    fn test_outcome_identifiers_last_writer_wins() {
        let mut outcome = QueryOutcome::default();
        outcome.process_event(StreamEvent::Fulfillment {
            answer: None,
            session_id: Some("sess-1".into()),
            message_id: Some("msg-1".into()),
        });
        outcome.process_event(StreamEvent::Fulfillment {
            answer: Some("x".into()),
            session_id: Some("sess-2".into()),
            message_id: None,
        });

        assert_eq!(outcome.session_id(), "sess-2");
        // Absent field leaves the prior value unchanged
        assert_eq!(outcome.message_id(), "msg-1");
    }

    #[test]
    fn test_outcome_metrics_overwritten_not_merged() {
        let mut outcome = QueryOutcome::default();

        let first: Map<String, Value> = serde_json::from_str(r#"{"tokens": 10, "cost": 1}"#).unwrap();
        let second: Map<String, Value> = serde_json::from_str(r#"{"tokens": 20}"#).unwrap();

        outcome.process_event(StreamEvent::Metrics {
            public_metrics: first,
        });
        outcome.process_event(StreamEvent::Metrics {
            public_metrics: second.clone(),
        });

        assert_eq!(outcome.metrics(), &second);
    }

    #[test]
    fn test_outcome_into_value() {
        let mut outcome = QueryOutcome::new(vec![ContextField::new("userId", "1")]);
        outcome.process_event(StreamEvent::Fulfillment {
            answer: Some("hi".into()),
            session_id: Some("sess-1".into()),
            message_id: Some("msg-1".into()),
        });

        let value = outcome.into_value();
        assert_eq!(
            value,
            serde_json::json!({
                "message": "Chat query submitted successfully",
                "data": {
                    "sessionId": "sess-1",
                    "messageId": "msg-1",
                    "answer": "hi",
                    "metrics": {},
                    "status": "completed",
                    "contextMetadata": [{"key": "userId", "value": "1"}],
                },
            })
        );
    }

    #[test]
    fn test_outcome_skipped_frames() {
        let mut outcome = QueryOutcome::default();
        assert_eq!(outcome.skipped_frames(), 0);
        outcome.record_skipped();
        outcome.record_skipped();
        assert_eq!(outcome.skipped_frames(), 2);
    }

    #[test]
    fn test_context_field_wire_shape() {
        let field = ContextField::new("name", "John");
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value, serde_json::json!({"key": "name", "value": "John"}));
    }
}
