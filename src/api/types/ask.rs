//! Question answering request and stream event types

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::infrastructure::services::AnswerRequest;

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub project_id: String,
    pub question: String,
    #[serde(default)]
    pub max_docs: Option<usize>,
    /// Prompt variant, e.g. `code_prompt` or `flowchart_prompt`
    #[serde(default, alias = "prompt_type")]
    pub variant: Option<String>,
}

impl From<AskRequest> for AnswerRequest {
    fn from(request: AskRequest) -> Self {
        Self {
            project_id: request.project_id,
            question: request.question,
            max_docs: request.max_docs,
            variant: request.variant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamEventType {
    Token,
    Complete,
    Error,
}

/// One server-sent event of an answer stream
#[derive(Debug, Clone, Serialize)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub event_type: StreamEventType,
    pub content: String,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

impl StreamEvent {
    fn new(event_type: StreamEventType, content: impl Into<String>) -> Self {
        Self {
            event_type,
            content: content.into(),
            timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
        }
    }

    pub fn token(content: impl Into<String>) -> Self {
        Self::new(StreamEventType::Token, content)
    }

    pub fn complete() -> Self {
        Self::new(StreamEventType::Complete, "")
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StreamEventType::Error, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_request_accepts_prompt_type_alias() {
        let request: AskRequest = serde_json::from_str(
            r#"{"project_id": "shop", "question": "What is X?", "prompt_type": "flowchart_prompt"}"#,
        )
        .unwrap();

        assert_eq!(request.variant.as_deref(), Some("flowchart_prompt"));
        assert_eq!(request.max_docs, None);
    }

    #[test]
    fn test_stream_event_serialization() {
        let json = serde_json::to_value(StreamEvent::token("Hello")).unwrap();

        assert_eq!(json["type"], "token");
        assert_eq!(json["content"], "Hello");
        assert!(json["timestamp"].as_f64().unwrap() > 1_600_000_000.0);

        let json = serde_json::to_value(StreamEvent::complete()).unwrap();
        assert_eq!(json["type"], "complete");
        assert_eq!(json["content"], "");
    }
}
