//! Planning sessions - multi-turn conversations with the model
//!
//! A session is opened with the rendered initial prompt and then carries
//! refinement messages. The full turn history travels with every request so
//! later turns see everything said before.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::LlmConfig;
use crate::llm::{Citation, CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, StopReason};
use crate::prompts::{PlanMode, PromptBuilder, PromptContext};

/// Shown when opening a session fails
pub const START_FAILED: &str = "Failed to communicate with the Metacognitive Planner.";

/// Shown when a follow-up turn fails
pub const CONTINUE_FAILED: &str = "Failed to continue the planning session.";

/// Substituted when the first reply has no text
pub const NO_PLAN_FALLBACK: &str = "I couldn't generate a plan. Please try again with more details.";

/// Substituted when a follow-up reply has no text
pub const NO_RESPONSE_FALLBACK: &str = "I couldn't generate a response.";

/// Session failures; the display text is the fixed user-facing message
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{}", START_FAILED)]
    Start(#[source] SessionFailure),

    #[error("{}", CONTINUE_FAILED)]
    Continue(#[source] SessionFailure),
}

/// Underlying cause of a session failure (logged, never shown)
#[derive(Debug, Error)]
pub enum SessionFailure {
    #[error("prompt rendering failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Per-turn model settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub web_search: bool,
    pub thinking_budget: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            web_search: true,
            thinking_budget: 12_000,
        }
    }
}

impl From<&LlmConfig> for SessionSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            web_search: config.web_search,
            thinking_budget: config.thinking_budget,
        }
    }
}

/// Handle to one live conversation
///
/// History is append-only and only grows after a turn succeeds.
#[derive(Debug)]
pub struct PlanningSession {
    id: Uuid,
    generation: u64,
    mode: PlanMode,
    model: String,
    history: Vec<Message>,
}

impl PlanningSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Controller generation this session was opened under
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mode(&self) -> PlanMode {
        self.mode
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Number of completed exchanges
    pub fn turn_count(&self) -> usize {
        self.history.len() / 2
    }
}

/// Opens and continues planning sessions against an LLM client
pub struct SessionClient {
    llm: Arc<dyn LlmClient>,
    prompts: PromptBuilder,
    settings: SessionSettings,
}

impl SessionClient {
    pub fn new(llm: Arc<dyn LlmClient>, settings: SessionSettings) -> eyre::Result<Self> {
        debug!(model = %llm.model(), ?settings, "SessionClient::new: called");
        Ok(Self {
            llm,
            prompts: PromptBuilder::new()?,
            settings,
        })
    }

    /// Render the initial prompt, open a session, and return the first reply
    pub async fn start_session(
        &self,
        context: &PromptContext,
        generation: u64,
    ) -> Result<(PlanningSession, String), SessionError> {
        debug!(mode = %context.mode, %generation, "start_session: called");
        let prompt = self.prompts.build(context).map_err(|e| {
            warn!(error = %e, "start_session: prompt rendering failed");
            SessionError::Start(SessionFailure::Prompt(e.to_string()))
        })?;

        let mut session = PlanningSession {
            id: Uuid::now_v7(),
            generation,
            mode: context.mode,
            model: self.llm.model().to_string(),
            history: Vec::new(),
        };

        let user = Message::user(prompt);
        let reply = self.send(&session, user.clone()).await.map_err(|e| {
            warn!(error = %e, "Planner API error");
            SessionError::Start(e.into())
        })?;

        let raw = reply.content.unwrap_or_else(|| NO_PLAN_FALLBACK.to_string());
        session.history.push(user);
        session.history.push(Message::assistant(raw.clone()));

        info!(session = %session.id, model = %session.model, "Planning session started");
        Ok((session, append_sources(&raw, &reply.citations)))
    }

    /// Send a follow-up message on an existing session
    ///
    /// On failure the session is left untouched and can be retried.
    pub async fn continue_session(&self, session: &mut PlanningSession, message: &str) -> Result<String, SessionError> {
        debug!(session = %session.id, turn = session.turn_count(), "continue_session: called");
        let user = Message::user(message);

        let reply = self.send(session, user.clone()).await.map_err(|e| {
            warn!(session = %session.id, error = %e, "Planner API error during chat");
            SessionError::Continue(e.into())
        })?;

        let raw = reply.content.unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string());
        session.history.push(user);
        session.history.push(Message::assistant(raw.clone()));

        info!(session = %session.id, turns = session.turn_count(), "Planning session continued");
        Ok(append_sources(&raw, &reply.citations))
    }

    async fn send(&self, session: &PlanningSession, next: Message) -> Result<CompletionResponse, LlmError> {
        let mut messages = session.history.clone();
        messages.push(next);

        let request = CompletionRequest {
            messages,
            web_search: self.settings.web_search,
            thinking_budget: self.settings.thinking_budget,
        };
        let reply = self.llm.complete(request).await.inspect_err(|e| {
            if e.is_auth_failure() {
                warn!(status = ?e.status(), "Planner rejected the API key");
            }
        })?;

        if reply.stop_reason != StopReason::EndTurn {
            warn!(stop_reason = ?reply.stop_reason, "Planner reply ended early");
        }
        debug!(
            input_tokens = reply.usage.input_tokens,
            output_tokens = reply.usage.output_tokens,
            "send: reply received"
        );
        Ok(reply)
    }
}

/// Append grounding citations as a markdown "Sources" section
///
/// Returns the text unchanged when there are no citations.
pub fn append_sources(text: &str, citations: &[Citation]) -> String {
    if citations.is_empty() {
        return text.to_string();
    }

    let sources = citations.iter().map(Citation::to_markdown).collect::<Vec<_>>().join("\n");
    format!("{}\n\n### Sources\n{}", text, sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::llm::client::mock::MockLlmClient;
    use crate::prompts::build_prompt;

    fn client(replies: Vec<Result<CompletionResponse, LlmError>>) -> (Arc<MockLlmClient>, SessionClient) {
        let mock = Arc::new(MockLlmClient::scripted(replies));
        let client = SessionClient::new(mock.clone(), SessionSettings::default()).unwrap();
        (mock, client)
    }

    fn context() -> PromptContext {
        PromptContext::new(PlanMode::Create, "Learn Spanish in 8 weeks, 30 min/day")
    }

    #[test]
    fn test_append_sources() {
        let citations = vec![
            Citation::new("Spacing", "https://a.example"),
            Citation::new("Interleaving", "https://b.example"),
        ];
        assert_eq!(
            append_sources("Plan", &citations),
            "Plan\n\n### Sources\n- [Spacing](https://a.example)\n- [Interleaving](https://b.example)"
        );
        assert_eq!(append_sources("Plan", &[]), "Plan");
    }

    #[tokio::test]
    async fn test_start_session_sends_rendered_prompt() {
        let (mock, client) = client(vec![Ok(CompletionResponse::text("| Week | Focus |"))]);

        let (session, text) = client.start_session(&context(), 7).await.unwrap();

        assert_eq!(text, "| Week | Focus |");
        assert_eq!(session.generation(), 7);
        assert_eq!(session.mode(), PlanMode::Create);
        assert_eq!(session.model(), "mock-model");
        assert_eq!(session.turn_count(), 1);

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].last_user_text(), Some(build_prompt(&context()).unwrap().as_str()));
        assert!(requests[0].web_search);
        assert_eq!(requests[0].thinking_budget, 12_000);
    }

    #[tokio::test]
    async fn test_continue_session_carries_prior_turns() {
        let (mock, client) = client(vec![
            Ok(CompletionResponse::text("What time span?")),
            Ok(CompletionResponse::text("| Week 1 | Vocabulary |")),
            Ok(CompletionResponse::text("| Week 1 | Vocabulary + Listening |")),
        ]);

        let (mut session, _) = client.start_session(&context(), 1).await.unwrap();
        let second = client.continue_session(&mut session, "Eight weeks").await.unwrap();
        let third = client.continue_session(&mut session, "Add listening").await.unwrap();

        assert_eq!(second, "| Week 1 | Vocabulary |");
        assert_eq!(third, "| Week 1 | Vocabulary + Listening |");

        let requests = mock.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(requests[2].messages.len(), 5);

        let last = &requests[2].messages;
        assert_eq!(last[1], Message::assistant("What time span?"));
        assert_eq!(last[2], Message::user("Eight weeks"));
        assert_eq!(last[3], Message::assistant("| Week 1 | Vocabulary |"));
        assert_eq!(last[4], Message::user("Add listening"));
        assert!(last.iter().step_by(2).all(|m| m.role == Role::User));
    }

    #[tokio::test]
    async fn test_sources_appended_in_provider_order() {
        let reply = CompletionResponse::text("Plan").with_citations(vec![
            Citation::new("Zeta", "https://z.example"),
            Citation::new("Alpha", "https://a.example"),
        ]);
        let (_, client) = client(vec![Ok(reply)]);

        let (session, text) = client.start_session(&context(), 1).await.unwrap();

        assert!(text.ends_with("### Sources\n- [Zeta](https://z.example)\n- [Alpha](https://a.example)"));
        // History keeps the raw reply
        assert_eq!(session.history()[1].text, "Plan");
    }

    #[tokio::test]
    async fn test_empty_replies_use_fallbacks() {
        let (_, client) = client(vec![Ok(CompletionResponse::default()), Ok(CompletionResponse::default())]);

        let (mut session, first) = client.start_session(&context(), 1).await.unwrap();
        assert_eq!(first, NO_PLAN_FALLBACK);

        let second = client.continue_session(&mut session, "more").await.unwrap();
        assert_eq!(second, NO_RESPONSE_FALLBACK);
    }

    #[tokio::test]
    async fn test_start_failure_is_typed() {
        let (_, client) = client(vec![Err(LlmError::ApiError {
            status: 500,
            message: "boom".to_string(),
        })]);

        let err = client.start_session(&context(), 1).await.unwrap_err();
        assert!(matches!(err, SessionError::Start(SessionFailure::Llm(_))));
        assert_eq!(err.to_string(), START_FAILED);
    }

    #[tokio::test]
    async fn test_failed_continue_leaves_session_retryable() {
        let (mock, client) = client(vec![
            Ok(CompletionResponse::text("Plan v1")),
            Err(LlmError::InvalidResponse("garbled".to_string())),
            Ok(CompletionResponse::text("Plan v2")),
        ]);

        let (mut session, _) = client.start_session(&context(), 1).await.unwrap();

        let err = client.continue_session(&mut session, "shorter blocks").await.unwrap_err();
        assert_eq!(err.to_string(), CONTINUE_FAILED);
        assert_eq!(session.turn_count(), 1);

        let retried = client.continue_session(&mut session, "shorter blocks").await.unwrap();
        assert_eq!(retried, "Plan v2");
        assert_eq!(session.turn_count(), 2);
        assert_eq!(mock.requests()[2].messages.len(), 3);
    }
}
