//! Request body construction

use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::{ContextField, QueryRequest};
use serde_json::{json, Value};

/// Build the session-creation body
pub(crate) fn session_body(config: &ClientConfig, metadata: &[ContextField]) -> Result<Value> {
    Ok(json!({
        "agentIds": config.agent_ids,
        "externalUserId": config.external_user_id,
        "contextMetadata": serde_json::to_value(metadata)?,
    }))
}

/// Build the query-submission body
pub(crate) fn query_body(config: &ClientConfig, request: &QueryRequest) -> Value {
    let configs = &request.model_configs;

    let mut model = json!({
        "stopSequences": configs.stop_sequences,
    });
    if let Some(prompt) = &configs.fulfillment_prompt {
        model["fulfillmentPrompt"] = json!(prompt);
    }
    if let Some(temperature) = configs.temperature {
        model["temperature"] = json!(temperature);
    }
    if let Some(top_p) = configs.top_p {
        model["topP"] = json!(top_p);
    }
    if let Some(max_tokens) = configs.max_tokens {
        model["maxTokens"] = json!(max_tokens);
    }
    if let Some(presence_penalty) = configs.presence_penalty {
        model["presencePenalty"] = json!(presence_penalty);
    }
    if let Some(frequency_penalty) = configs.frequency_penalty {
        model["frequencyPenalty"] = json!(frequency_penalty);
    }

    json!({
        "endpointId": config.endpoint_id,
        "query": request.query,
        "agentIds": config.agent_ids,
        "responseMode": request.response_mode.as_str(),
        "reasoningMode": config.reasoning_mode,
        "modelConfigs": model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseMode;
    use crate::types::ModelConfigs;
    use pretty_assertions::assert_eq;

    fn test_config() -> ClientConfig {
        ClientConfig::new("key")
            .with_external_user_id("user-1")
            .with_agent_ids(vec!["agent-1"])
    }

    #[test]
    fn test_session_body() {
        let metadata = vec![
            ContextField::new("userId", "1"),
            ContextField::new("name", "John"),
        ];
        let body = session_body(&test_config(), &metadata).unwrap();

        assert_eq!(
            body,
            json!({
                "agentIds": ["agent-1"],
                "externalUserId": "user-1",
                "contextMetadata": [
                    {"key": "userId", "value": "1"},
                    {"key": "name", "value": "John"},
                ],
            })
        );
    }

    #[test]
    fn test_query_body_full() {
        let request = QueryRequest::builder()
            .query("hello")
            .response_mode(ResponseMode::Stream)
            .model_configs(
                ModelConfigs::builder()
                    .fulfillment_prompt("")
                    .temperature(0.7)
                    .top_p(1.0)
                    .max_tokens(0)
                    .presence_penalty(0.0)
                    .frequency_penalty(0.0)
                    .build(),
            )
            .try_build()
            .unwrap();

        let body = query_body(&test_config(), &request);

        assert_eq!(
            body,
            json!({
                "endpointId": "predefined-openai-gpt4o",
                "query": "hello",
                "agentIds": ["agent-1"],
                "responseMode": "stream",
                "reasoningMode": "medium",
                "modelConfigs": {
                    "fulfillmentPrompt": "",
                    "stopSequences": [],
                    "temperature": 0.7,
                    "topP": 1.0,
                    "maxTokens": 0,
                    "presencePenalty": 0.0,
                    "frequencyPenalty": 0.0,
                },
            })
        );
    }

    #[test]
    fn test_query_body_omits_unset_model_fields() {
        let request = QueryRequest::builder()
            .query("hello")
            .response_mode(ResponseMode::Sync)
            .try_build()
            .unwrap();

        let body = query_body(&test_config(), &request);
        assert_eq!(body["responseMode"], "sync");
        assert_eq!(body["modelConfigs"], json!({"stopSequences": []}));
    }
}
