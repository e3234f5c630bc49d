// blueprint/types.rs — Production blueprint returned by the text model

use serde::{Deserialize, Serialize};

/// One narrated beat of the script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSegment {
    /// Display label such as "0:15"
    #[serde(default)]
    pub timestamp: String,
    /// Narration line
    pub talk: String,
    /// What is on screen while the line is spoken
    pub visual: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AudioAtmosphere {
    pub intro: String,
    pub background: String,
    pub sfx: String,
    pub outro: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeoMetadata {
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Full video plan. Field names follow the response schema (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub title: String,
    pub hook: String,
    pub deep_dive: String,
    pub script: Vec<ScriptSegment>,
    #[serde(default)]
    pub visualization_idea: String,
    pub code_sample: String,
    #[serde(default)]
    pub audio_atmosphere: AudioAtmosphere,
    #[serde(default)]
    pub seo: SeoMetadata,
}

impl Blueprint {
    pub fn segment_count(&self) -> usize {
        self.script.len()
    }
}
