//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call carries the full conversation
///
/// Conversation state lives with the caller (see `session::PlanningSession`).
/// Every call is a single network round trip; implementations do not retry.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one turn and wait for the complete reply
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}
