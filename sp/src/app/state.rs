//! Application state
//!
//! Pure data structures for the planner flow. No I/O here.

use tracing::debug;

use crate::prompts::PlanMode;

/// Local validation error for an empty submission
pub const EMPTY_INPUT: &str = "Please provide some input details first!";

/// Shown when a refinement turn fails
pub const REFINE_FAILED: &str = "Failed to update plan. Please try again.";

/// Rotating status lines shown while a request is in flight
pub const LOADING_MESSAGES: &[&str] = &[
    "Analyzing your learning patterns...",
    "Consulting the Metacognitive Oracle...",
    "Structuring your Pomodoro blocks...",
    "Interleaving your topics for maximum retention...",
    "Calibrating difficulty levels...",
    "Designing your path to mastery...",
    "Optimizing for long-term retention...",
];

/// Which screen the flow is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    /// Mode selection
    #[default]
    Welcome,
    /// Collecting goals or an existing schedule
    Input,
    /// Waiting for the first plan
    Processing,
    /// Plan shown, refinements allowed
    Result,
}

/// Everything the front end renders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub step: Step,
    pub mode: Option<PlanMode>,
    pub user_input: String,
    pub plan_result: String,
    pub error: Option<String>,
    pub is_refining: bool,
    pub is_parsing_file: bool,
    /// Bumped on every reset and mode change; replies tagged with an older
    /// value are dropped
    pub generation: u64,
    /// True once a session has been opened under the current generation
    pub has_session: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a refinement could be sent right now
    pub fn can_refine(&self) -> bool {
        self.step == Step::Result && self.has_session && !self.is_refining
    }

    /// Whether any request is outstanding
    pub fn is_busy(&self) -> bool {
        self.step == Step::Processing || self.is_refining
    }

    /// Whether a reply tagged with `generation` still applies
    pub fn is_current(&self, generation: u64) -> bool {
        let current = generation == self.generation;
        if !current {
            debug!(generation, current = self.generation, "AppState::is_current: stale generation");
        }
        current
    }
}
