use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Idle,
    Loading,
    Done,
    Error { message: String },
}

impl StageStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, StageStatus::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, StageStatus::Done | StageStatus::Error { .. })
    }
}

/// Asset stages launched in parallel once the blueprint is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStage {
    Thumbnail,
    Voiceover,
    Visuals,
}

impl AssetStage {
    pub const ALL: [AssetStage; 3] = [AssetStage::Thumbnail, AssetStage::Voiceover, AssetStage::Visuals];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStage::Thumbnail => "thumbnail",
            AssetStage::Voiceover => "voiceover",
            AssetStage::Visuals => "visuals",
        }
    }
}

impl fmt::Display for AssetStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
