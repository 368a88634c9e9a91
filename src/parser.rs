//! Response and event-frame parsing

use crate::error::{Error, Result};
use crate::types::{ContextField, StreamEvent};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Prefix marking a significant line in the event stream
const DATA_PREFIX: &str = "data:";

/// Sentinel payload terminating the event stream
const DONE_SENTINEL: &str = "[DONE]";

/// What a single stream line amounted to
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FrameOutcome {
    /// A decoded event
    Event(StreamEvent),
    /// The completion sentinel
    Done,
    /// A `data:` line that failed to decode as JSON; tolerated and counted
    Malformed,
    /// A decoded frame of no interest (unknown kind, empty metrics)
    Ignored,
}

/// Parse one line of the event stream
///
/// Returns `None` for lines without the `data:` prefix, which carry no
/// events in this protocol.
pub(crate) fn parse_line(line: &str) -> Option<FrameOutcome> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();

    if payload == DONE_SENTINEL {
        return Some(FrameOutcome::Done);
    }

    let frame: Frame = match serde_json::from_str(payload) {
        Ok(frame) => frame,
        Err(_) => return Some(FrameOutcome::Malformed),
    };

    match frame.event_type.as_str() {
        "fulfillment" => Some(FrameOutcome::Event(StreamEvent::Fulfillment {
            answer: frame.answer,
            session_id: frame.session_id,
            message_id: frame.message_id,
        })),
        "metricsLog" => match frame.public_metrics {
            Some(public_metrics) => Some(FrameOutcome::Event(StreamEvent::Metrics {
                public_metrics,
            })),
            None => Some(FrameOutcome::Ignored),
        },
        _ => Some(FrameOutcome::Ignored),
    }
}

/// Extract the session identifier and echoed metadata from a
/// session-creation response
pub(crate) fn parse_session_response(value: Value) -> Result<(String, Vec<ContextField>)> {
    let envelope: SessionEnvelope =
        serde_json::from_value(value).map_err(|e| Error::Serialization {
            message: format!("Unexpected session response shape: {}", e),
            source: Some(Box::new(e)),
        })?;

    Ok((envelope.data.id, envelope.data.context_metadata))
}

// Wire structures

#[derive(Deserialize)]
struct Frame {
    #[serde(default, rename = "eventType")]
    event_type: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default, rename = "sessionId")]
    session_id: Option<String>,
    #[serde(default, rename = "messageId")]
    message_id: Option<String>,
    #[serde(default, rename = "publicMetrics")]
    public_metrics: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct SessionEnvelope {
    data: SessionData,
}

#[derive(Deserialize)]
struct SessionData {
    id: String,
    #[serde(default, rename = "contextMetadata")]
    context_metadata: Vec<ContextField>,
}
