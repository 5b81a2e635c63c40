//! Request and payload models for the streaming endpoints.
//!
//! Every request type serializes a `stream: true` flag alongside its
//! endpoint-specific fields; the backend answers all of them with the same
//! newline-delimited `data:` frame convention.

use itertools::Itertools;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use crate::client::StreamRequest;

/// Role of the message sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One segment of a media transcription, as produced by the transcription
/// backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment start time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,

    /// Speaker label, when diarization is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,

    pub text: String,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            start: None,
            speaker: None,
            text: text.into(),
        }
    }
}

/// Request body for the streaming summary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    /// Transcript text to summarize.
    pub text: String,
    pub stream: bool,
}

impl SummaryRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stream: true,
        }
    }
}

impl StreamRequest for SummaryRequest {
    fn path(&self) -> &str {
        "api/summary"
    }
}

/// Request body for the streaming chat endpoint.
///
/// A chat request always carries at least one message; the optional
/// context is the transcript the conversation is about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: NonEmpty<ChatMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    pub stream: bool,
}

impl ChatRequest {
    pub fn new(messages: NonEmpty<ChatMessage>) -> Self {
        Self {
            messages,
            context: None,
            stream: true,
        }
    }

    /// Start a conversation from a single user message.
    pub fn from_user(content: impl Into<String>) -> Self {
        Self::new(NonEmpty::new(ChatMessage::user(content)))
    }

    /// Set the conversation context verbatim.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Assemble the conversation context from transcript segments.
    pub fn with_transcript(mut self, segments: &[TranscriptSegment]) -> Self {
        self.context = Some(segments.iter().map(|s| s.text.as_str()).join("\n"));
        self
    }
}

impl StreamRequest for ChatRequest {
    fn path(&self) -> &str {
        "api/chat"
    }
}

/// Request body for the streaming teaching-evaluation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Transcript text to evaluate.
    pub text: String,

    /// Evaluation criteria; the backend applies its defaults when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Vec<String>>,

    pub stream: bool,
}

impl EvaluationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            criteria: None,
            stream: true,
        }
    }

    pub fn with_criteria(mut self, criteria: Vec<String>) -> Self {
        self.criteria = Some(criteria);
        self
    }
}

impl StreamRequest for EvaluationRequest {
    fn path(&self) -> &str {
        "api/evaluation"
    }
}

/// Structured shape of a JSON frame payload.
///
/// Servers send either `{"content": "..."}` or the OpenAI-style
/// `{"delta": {"content": "..."}}`; both carry the same text delta.
#[derive(Debug, Clone, Deserialize)]
pub struct FramePayload {
    pub content: Option<String>,
    pub delta: Option<DeltaField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeltaField {
    pub content: Option<String>,
}

impl FramePayload {
    /// The text delta this payload carries, if any. The top-level
    /// `content` field wins over the nested one.
    pub fn delta_text(self) -> Option<String> {
        let FramePayload { content, delta } = self;
        content.or_else(|| delta.and_then(|d| d.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_request_serializes_stream_flag() {
        let request = SummaryRequest::new("transcript");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"text": "transcript", "stream": true})
        );
        assert_eq!(request.path(), "api/summary");
    }

    #[test]
    fn chat_request_serializes_messages_and_context() {
        let request = ChatRequest::from_user("what was covered?").with_context("lecture notes");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "messages": [{"role": "user", "content": "what was covered?"}],
                "context": "lecture notes",
                "stream": true,
            })
        );
    }

    #[test]
    fn absent_context_is_omitted() {
        let request = ChatRequest::from_user("hi");
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("context").is_none());
    }

    #[test]
    fn transcript_segments_join_into_context() {
        let segments = vec![
            TranscriptSegment::new("first sentence."),
            TranscriptSegment::new("second sentence."),
        ];
        let request = ChatRequest::from_user("summarize").with_transcript(&segments);
        assert_eq!(
            request.context.as_deref(),
            Some("first sentence.\nsecond sentence.")
        );
    }

    #[test]
    fn evaluation_request_carries_criteria() {
        let request = EvaluationRequest::new("transcript")
            .with_criteria(vec!["clarity".to_string(), "pacing".to_string()]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["criteria"], json!(["clarity", "pacing"]));
        assert_eq!(request.path(), "api/evaluation");
    }

    #[test]
    fn frame_payload_prefers_top_level_content() {
        let payload: FramePayload =
            serde_json::from_str(r#"{"content":"a","delta":{"content":"b"}}"#).unwrap();
        assert_eq!(payload.delta_text(), Some("a".to_string()));

        let payload: FramePayload = serde_json::from_str(r#"{"delta":{"content":"b"}}"#).unwrap();
        assert_eq!(payload.delta_text(), Some("b".to_string()));

        let payload: FramePayload = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert_eq!(payload.delta_text(), None);
    }
}
