//! Embedded prompts
//!
//! These are compiled into the binary from the files under `prompts/`.

use tracing::debug;

/// Template for turning stated goals into a new plan
pub const CREATE: &str = include_str!("../../prompts/create.pmt");

/// Template for reviewing and improving an existing plan
pub const ENHANCE: &str = include_str!("../../prompts/enhance.pmt");

/// Study-technique reference text embedded in every prompt
pub const KNOWLEDGE_BASE: &str = include_str!("../../prompts/knowledge-base.md");

/// Get the embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "create" => {
            debug!("get_embedded: matched create");
            Some(CREATE)
        }
        "enhance" => {
            debug!("get_embedded: matched enhance");
            Some(ENHANCE)
        }
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_create() {
        let create = get_embedded("create").unwrap();
        assert!(create.contains("creative Metacognitive Planner and Scheduler"));
        assert!(create.contains("{{knowledge_base}}"));
        assert!(create.contains("{{input_data}}"));
    }

    #[test]
    fn test_get_embedded_enhance() {
        let enhance = get_embedded("enhance").unwrap();
        assert!(enhance.contains("critical Metacognitive Planning Analyst"));
        assert!(enhance.contains("{{detected_type}}"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }

    #[test]
    fn test_knowledge_base_sections() {
        for heading in [
            "Retrieval Practice",
            "Spaced Practice",
            "Interleaved Practice",
            "Pomodoro Technique",
            "Deliberate Practice",
        ] {
            assert!(KNOWLEDGE_BASE.contains(heading), "missing {heading}");
        }
    }
}
