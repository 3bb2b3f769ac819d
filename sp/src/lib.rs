//! Metacognitive Study Planner
//!
//! Helps a learner create a study schedule from their goals, or enhance an
//! existing one, by holding a grounded multi-turn conversation with a
//! reasoning model primed with a fixed study-technique knowledge base.
//!
//! # Modules
//!
//! - [`document`] - Plain text, PDF, and DOCX text extraction
//! - [`prompts`] - Mode-specific prompt rendering
//! - [`llm`] - LLM client trait and Gemini implementation
//! - [`session`] - Multi-turn planning sessions with cited sources
//! - [`app`] - Reducer and controller for the planner flow
//! - [`export`] - Saving the plan as markdown
//! - [`repl`] - Interactive terminal front end
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod app;
pub mod cli;
pub mod config;
pub mod document;
pub mod export;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod session;

// Re-export commonly used types
pub use app::{AppState, Controller, Effect, Event, Step, reduce};
pub use config::{Config, ExportConfig, LlmConfig};
pub use document::{DocumentKind, ExtractionError, extract};
pub use llm::{Citation, CompletionRequest, CompletionResponse, GeminiClient, LlmClient, LlmError, create_client};
pub use prompts::{PlanMode, PromptBuilder, PromptContext, build_prompt};
pub use session::{PlanningSession, SessionClient, SessionError, SessionSettings};
