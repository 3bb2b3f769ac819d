//! LLM request/response types for the study planner
//!
//! These types model a multi-turn chat exchange with web grounding. They are
//! provider-agnostic; the Gemini client maps them onto its wire format.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A completion request - everything needed for one model turn
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Full conversation so far, ending with the new user turn
    pub messages: Vec<Message>,

    /// Allow the model to consult web search while answering
    pub web_search: bool,

    /// Token budget for the model's internal reasoning
    pub thinking_budget: u32,
}

impl CompletionRequest {
    /// Text of the last user turn, if any
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.text.as_str())
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create an assistant (model) message
    pub fn assistant(text: impl Into<String>) -> Self {
        debug!("Message::assistant: called");
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A web source the model reports having consulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

impl Citation {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }

    /// Render as a markdown list item
    pub fn to_markdown(&self) -> String {
        format!("- [{}]({})", self.title, self.uri)
    }
}

/// Response from a completion request
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Grounding citations, in the order the provider listed them
    pub citations: Vec<Citation>,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token usage for logging
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Convenience constructor for a plain text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Attach grounding citations
    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StopReason {
    #[default]
    EndTurn,
    MaxTokens,
    Safety,
    Other(String),
}

impl StopReason {
    /// Parse from a Gemini `finishReason` string
    pub fn from_gemini(s: &str) -> Self {
        debug!(%s, "StopReason::from_gemini: called");
        match s {
            "STOP" => StopReason::EndTurn,
            "MAX_TOKENS" => StopReason::MaxTokens,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => StopReason::Safety,
            other => {
                debug!(%other, "StopReason::from_gemini: unrecognized finish reason");
                StopReason::Other(other.to_string())
            }
        }
    }
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub thinking_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_user() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text, "Hello");
    }

    #[test]
    fn test_message_assistant() {
        let msg = Message::assistant("Hi there");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text, "Hi there");
    }

    #[test]
    fn test_last_user_text() {
        let request = CompletionRequest {
            messages: vec![Message::user("first"), Message::assistant("reply"), Message::user("second")],
            web_search: true,
            thinking_budget: 0,
        };
        assert_eq!(request.last_user_text(), Some("second"));
    }

    #[test]
    fn test_citation_to_markdown() {
        let citation = Citation::new("Spacing effect", "https://example.com/spacing");
        assert_eq!(citation.to_markdown(), "- [Spacing effect](https://example.com/spacing)");
    }

    #[test]
    fn test_stop_reason_from_gemini() {
        assert_eq!(StopReason::from_gemini("STOP"), StopReason::EndTurn);
        assert_eq!(StopReason::from_gemini("MAX_TOKENS"), StopReason::MaxTokens);
        assert_eq!(StopReason::from_gemini("SAFETY"), StopReason::Safety);
        assert_eq!(
            StopReason::from_gemini("MALFORMED_FUNCTION_CALL"),
            StopReason::Other("MALFORMED_FUNCTION_CALL".to_string())
        );
    }
}
