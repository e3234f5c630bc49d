// blueprint/prompts.rs — Prompt builders for every generation stage

use super::{Blueprint, ScriptSegment};

pub fn blueprint_prompt(topic: &str, subject: &str) -> String {
    format!(
        "Act as a world-class {subject} technical content creator.\n\
        Transform the following {subject} content into an advanced, high-production-value \
        YouTube video blueprint.\n\n\
        Content: \"{topic}\"\n\n\
        Focus on:\n\
        1. Runtime internals and low-level mechanics.\n\
        2. Modern {subject} language features.\n\
        3. Design patterns and clean code architecture.\n\n\
        Return a JSON object with:\n\
        - title: Catchy YouTube title.\n\
        - hook: A compelling 15-second intro hook.\n\
        - deepDive: An advanced technical explanation of the core concept.\n\
        - script: An array of 4 to 8 objects [{{timestamp, talk, visual}}].\n\
        - visualizationIdea: A complex animation or diagram to show.\n\
        - codeSample: A robust, advanced {subject} snippet demonstrating the concept.\n\
        - audioAtmosphere: {{intro, background, sfx, outro}}.\n\
        - seo: {{description, tags}} for the video page.",
        subject = subject,
        topic = topic.trim(),
    )
}

pub fn thumbnail_prompt(blueprint: &Blueprint, subject: &str) -> String {
    format!(
        "A professional high-quality YouTube thumbnail for a {} programming video titled \"{}\". \
        Visual style: modern, high-contrast, dark mode, abstract digital network, \
        cinematic lighting, coding aesthetic.",
        subject, blueprint.title
    )
}

/// Text handed to the speech model: the hook followed by every script line.
pub fn narration_prompt(blueprint: &Blueprint) -> String {
    let lines = std::iter::once(blueprint.hook.trim())
        .chain(blueprint.script.iter().map(|s| s.talk.trim()))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    format!("Narrate in a clear, energetic teaching voice:\n{}", lines)
}

pub fn clip_prompt(blueprint: &Blueprint, segment: &ScriptSegment, subject: &str) -> String {
    format!(
        "A cinematic, high-quality technical video clip for a {} tutorial titled \"{}\". \
        Visuals: a futuristic 3D workspace, glowing code, abstract data streams, \
        professional lighting. Scene: {}",
        subject, blueprint.title, segment.visual
    )
}
