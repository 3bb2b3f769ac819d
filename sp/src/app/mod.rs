//! Application controller
//!
//! The planner flow is a state machine: a pure reducer decides every
//! transition and the async `Controller` carries out the resulting effects.

mod controller;
mod reducer;
mod state;

pub use controller::Controller;
pub use reducer::{Effect, Event, reduce};
pub use state::{AppState, EMPTY_INPUT, LOADING_MESSAGES, REFINE_FAILED, Step};
