// blueprint/mod.rs — Blueprint model, response schema and validation

pub mod prompts;
mod schema;
mod types;

pub use schema::blueprint_schema;
pub use types::{AudioAtmosphere, Blueprint, ScriptSegment, SeoMetadata};

use crate::genai::GenAiError;
use serde_json::Value;

/// Turn the structured response into a [`Blueprint`], rejecting shapes the pipeline cannot use.
pub fn parse_blueprint(value: Value) -> Result<Blueprint, GenAiError> {
    let blueprint: Blueprint = serde_json::from_value(value)
        .map_err(|e| GenAiError::MalformedResponse(format!("blueprint: {}", e)))?;
    validate(&blueprint)?;
    Ok(blueprint)
}

fn validate(blueprint: &Blueprint) -> Result<(), GenAiError> {
    if blueprint.title.trim().is_empty() {
        return Err(GenAiError::MalformedResponse("blueprint has no title".into()));
    }
    if blueprint.script.is_empty() {
        return Err(GenAiError::MalformedResponse("blueprint has no script".into()));
    }
    if let Some(idx) = blueprint.script.iter().position(|s| s.talk.trim().is_empty()) {
        return Err(GenAiError::MalformedResponse(format!(
            "script segment {} has no narration",
            idx
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_blueprint(segments: usize) -> Blueprint {
    Blueprint {
        title: "Virtual Threads Under the Hood".to_string(),
        hook: "What if a million threads cost almost nothing?".to_string(),
        deep_dive: "Continuations mounted on carrier threads.".to_string(),
        script: (1..=segments)
            .map(|i| ScriptSegment {
                timestamp: format!("0:{:02}", i * 10),
                talk: format!("Line {}", i),
                visual: format!("Scene {}", i),
            })
            .collect(),
        visualization_idea: "Carrier threads as conveyor belts".to_string(),
        code_sample: "Thread.ofVirtual().start(task);".to_string(),
        audio_atmosphere: AudioAtmosphere::default(),
        seo: SeoMetadata {
            description: "Loom explained".to_string(),
            tags: vec!["java".to_string(), "loom".to_string()],
        },
    }
}
