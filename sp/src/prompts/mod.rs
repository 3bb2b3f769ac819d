//! Prompt Template System
//!
//! Renders the initial planning prompt for a session. Two fixed templates
//! (`create` and `enhance`) are compiled into the binary together with the
//! study-technique knowledge base, and rendered with Handlebars.

pub mod embedded;
mod builder;

pub use builder::{PlanMode, PromptBuilder, PromptContext, build_prompt};
