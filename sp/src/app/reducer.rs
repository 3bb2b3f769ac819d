//! State transitions
//!
//! `reduce` is the only place `AppState` changes. It never performs I/O;
//! work that needs the network comes back as `Effect`s for the controller.

use tracing::debug;

use super::state::{AppState, EMPTY_INPUT, Step};
use crate::prompts::{PlanMode, PromptContext};

/// Something that happened: a user action or a finished request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectMode(PlanMode),
    InputChanged(String),
    FileParsing,
    FileLoaded(String),
    FileFailed(String),
    Submit,
    SessionStarted { generation: u64, text: String },
    SessionFailed { generation: u64, message: String },
    Refine(String),
    Refined { generation: u64, text: String },
    RefineFailed { generation: u64, message: String },
    Reset,
}

/// Work requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Drop the live session, if any
    DiscardSession,
    /// Open a new session with the rendered prompt
    StartSession { generation: u64, context: PromptContext },
    /// Send a refinement on the live session
    ContinueSession { generation: u64, message: String },
}

/// Apply one event to the state and return the effects it requests
pub fn reduce(state: &mut AppState, event: Event) -> Vec<Effect> {
    debug!(step = ?state.step, generation = state.generation, ?event, "reduce: called");
    match event {
        Event::SelectMode(mode) => {
            state.generation += 1;
            state.step = Step::Input;
            state.mode = Some(mode);
            state.user_input.clear();
            state.plan_result.clear();
            state.error = None;
            state.is_refining = false;
            state.is_parsing_file = false;
            state.has_session = false;
            vec![Effect::DiscardSession]
        }
        Event::InputChanged(text) => {
            state.user_input = text;
            vec![]
        }
        Event::FileParsing => {
            state.is_parsing_file = true;
            state.error = None;
            vec![]
        }
        Event::FileLoaded(text) => {
            state.user_input = text;
            state.is_parsing_file = false;
            vec![]
        }
        Event::FileFailed(message) => {
            state.error = Some(message);
            state.is_parsing_file = false;
            vec![]
        }
        Event::Submit => submit(state),
        Event::SessionStarted { generation, text } => {
            if state.is_current(generation) && state.step == Step::Processing {
                state.step = Step::Result;
                state.plan_result = text;
                state.has_session = true;
            }
            vec![]
        }
        Event::SessionFailed { generation, message } => {
            if !state.is_current(generation) {
                return vec![];
            }
            state.step = Step::Input;
            state.error = Some(message);
            state.has_session = false;
            vec![Effect::DiscardSession]
        }
        Event::Refine(message) => {
            if !state.can_refine() || message.trim().is_empty() {
                debug!(step = ?state.step, has_session = state.has_session, "reduce: refine ignored");
                return vec![];
            }
            state.is_refining = true;
            state.error = None;
            vec![Effect::ContinueSession {
                generation: state.generation,
                message,
            }]
        }
        Event::Refined { generation, text } => {
            if state.is_current(generation) {
                state.plan_result = text;
                state.is_refining = false;
            }
            vec![]
        }
        Event::RefineFailed { generation, message } => {
            if state.is_current(generation) {
                state.error = Some(message);
                state.is_refining = false;
            }
            vec![]
        }
        Event::Reset => {
            let generation = state.generation + 1;
            *state = AppState {
                generation,
                ..AppState::default()
            };
            vec![Effect::DiscardSession]
        }
    }
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    let Some(mode) = state.mode else {
        debug!("submit: no mode selected, ignoring");
        return vec![];
    };
    if state.step != Step::Input || state.is_parsing_file {
        debug!(step = ?state.step, "submit: not accepting input, ignoring");
        return vec![];
    }
    if state.user_input.trim().is_empty() {
        state.error = Some(EMPTY_INPUT.to_string());
        return vec![];
    }

    state.step = Step::Processing;
    state.error = None;
    vec![Effect::StartSession {
        generation: state.generation,
        context: PromptContext::new(mode, state.user_input.clone()),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_input(mode: PlanMode, input: &str) -> AppState {
        let mut state = AppState::new();
        reduce(&mut state, Event::SelectMode(mode));
        reduce(&mut state, Event::InputChanged(input.to_string()));
        state
    }

    fn in_result() -> AppState {
        let mut state = in_input(PlanMode::Create, "Learn Rust");
        reduce(&mut state, Event::Submit);
        let generation = state.generation;
        reduce(
            &mut state,
            Event::SessionStarted {
                generation,
                text: "plan v1".to_string(),
            },
        );
        state
    }

    #[test]
    fn test_select_mode_enters_input_and_discards() {
        let mut state = AppState::new();
        let effects = reduce(&mut state, Event::SelectMode(PlanMode::Enhance));

        assert_eq!(effects, vec![Effect::DiscardSession]);
        assert_eq!(state.step, Step::Input);
        assert_eq!(state.mode, Some(PlanMode::Enhance));
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn test_blank_submit_sets_local_error() {
        for input in ["", "   ", "\n\t"] {
            let mut state = in_input(PlanMode::Create, input);
            let effects = reduce(&mut state, Event::Submit);

            assert!(effects.is_empty());
            assert_eq!(state.step, Step::Input);
            assert_eq!(state.error.as_deref(), Some(EMPTY_INPUT));
        }
    }

    #[test]
    fn test_submit_requests_session() {
        let mut state = in_input(PlanMode::Enhance, "Mon: Math");
        state.error = Some("old".to_string());

        let effects = reduce(&mut state, Event::Submit);

        assert_eq!(state.step, Step::Processing);
        assert!(state.error.is_none());
        assert_eq!(
            effects,
            vec![Effect::StartSession {
                generation: 1,
                context: PromptContext::new(PlanMode::Enhance, "Mon: Math"),
            }]
        );
    }

    #[test]
    fn test_submit_ignored_while_parsing_file() {
        let mut state = in_input(PlanMode::Enhance, "Mon: Math");
        reduce(&mut state, Event::FileParsing);
        assert!(reduce(&mut state, Event::Submit).is_empty());
        assert_eq!(state.step, Step::Input);
    }

    #[test]
    fn test_session_started_shows_result() {
        let state = in_result();
        assert_eq!(state.step, Step::Result);
        assert_eq!(state.plan_result, "plan v1");
        assert!(state.has_session);
    }

    #[test]
    fn test_session_failed_returns_to_input() {
        let mut state = in_input(PlanMode::Create, "Learn Rust");
        reduce(&mut state, Event::Submit);
        let generation = state.generation;

        let effects = reduce(
            &mut state,
            Event::SessionFailed {
                generation,
                message: "boom".to_string(),
            },
        );

        assert_eq!(effects, vec![Effect::DiscardSession]);
        assert_eq!(state.step, Step::Input);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert!(!state.has_session);
        assert_eq!(state.user_input, "Learn Rust");
    }

    #[test]
    fn test_file_events() {
        let mut state = in_input(PlanMode::Enhance, "");
        state.error = Some("stale".to_string());

        reduce(&mut state, Event::FileParsing);
        assert!(state.is_parsing_file);
        assert!(state.error.is_none());

        reduce(&mut state, Event::FileLoaded("Week 1: Physics".to_string()));
        assert!(!state.is_parsing_file);
        assert_eq!(state.user_input, "Week 1: Physics");

        reduce(&mut state, Event::FileParsing);
        reduce(&mut state, Event::FileFailed("bad file".to_string()));
        assert!(!state.is_parsing_file);
        assert_eq!(state.error.as_deref(), Some("bad file"));
    }

    #[test]
    fn test_refine_guards() {
        let mut state = in_result();
        assert!(reduce(&mut state, Event::Refine("   ".to_string())).is_empty());

        let effects = reduce(&mut state, Event::Refine("more breaks".to_string()));
        assert_eq!(
            effects,
            vec![Effect::ContinueSession {
                generation: state.generation,
                message: "more breaks".to_string(),
            }]
        );
        assert!(state.is_refining);

        // Overlapping refinement is rejected
        assert!(reduce(&mut state, Event::Refine("again".to_string())).is_empty());
    }

    #[test]
    fn test_refine_without_session_is_noop() {
        let mut state = in_input(PlanMode::Create, "x");
        assert!(reduce(&mut state, Event::Refine("more".to_string())).is_empty());
        assert!(!state.is_refining);
    }

    #[test]
    fn test_refine_failed_keeps_plan() {
        let mut state = in_result();
        reduce(&mut state, Event::Refine("more".to_string()));
        let generation = state.generation;
        reduce(
            &mut state,
            Event::RefineFailed {
                generation,
                message: "nope".to_string(),
            },
        );

        assert_eq!(state.plan_result, "plan v1");
        assert_eq!(state.error.as_deref(), Some("nope"));
        assert!(state.has_session);
        assert!(!state.is_refining);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = in_result();
        let before = state.generation;

        let effects = reduce(&mut state, Event::Reset);

        assert_eq!(effects, vec![Effect::DiscardSession]);
        assert_eq!(
            state,
            AppState {
                generation: before + 1,
                ..AppState::default()
            }
        );
    }

    #[test]
    fn test_stale_replies_are_dropped() {
        let mut state = in_input(PlanMode::Create, "Learn Rust");
        reduce(&mut state, Event::Submit);
        let stale = state.generation;

        reduce(&mut state, Event::Reset);
        reduce(&mut state, Event::SelectMode(PlanMode::Enhance));
        let snapshot = state.clone();

        let effects = reduce(
            &mut state,
            Event::SessionStarted {
                generation: stale,
                text: "late plan".to_string(),
            },
        );
        assert!(effects.is_empty());
        assert!(reduce(
            &mut state,
            Event::SessionFailed {
                generation: stale,
                message: "late failure".to_string(),
            }
        )
        .is_empty());
        reduce(
            &mut state,
            Event::Refined {
                generation: stale,
                text: "late refine".to_string(),
            },
        );

        assert_eq!(state, snapshot);
    }
}
