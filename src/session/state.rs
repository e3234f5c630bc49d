use super::{AssetStage, StageStatus, Thumbnail, Voiceover};
use crate::blueprint::Blueprint;
use crate::playback::Clip;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub type RunId = Uuid;

const NO_CLIPS_MESSAGE: &str = "No clips could be generated. Please try again.";

/// Everything that can change a production run. Each event names the run it belongs to.
#[derive(Debug, Clone)]
pub enum StudioEvent {
    RunStarted { run_id: RunId, topic: String },
    BlueprintReady { run_id: RunId, blueprint: Blueprint },
    BlueprintFailed { run_id: RunId, message: String },
    AssetsLaunched { run_id: RunId },
    ThumbnailReady { run_id: RunId, thumbnail: Thumbnail },
    VoiceoverReady { run_id: RunId, voiceover: Voiceover },
    ClipReady { run_id: RunId, clip: Clip },
    VisualsProgress { run_id: RunId, message: String },
    VisualsFinished { run_id: RunId, failure: Option<String> },
    StageFailed { run_id: RunId, stage: AssetStage, message: String },
}

impl StudioEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            StudioEvent::RunStarted { run_id, .. }
            | StudioEvent::BlueprintReady { run_id, .. }
            | StudioEvent::BlueprintFailed { run_id, .. }
            | StudioEvent::AssetsLaunched { run_id }
            | StudioEvent::ThumbnailReady { run_id, .. }
            | StudioEvent::VoiceoverReady { run_id, .. }
            | StudioEvent::ClipReady { run_id, .. }
            | StudioEvent::VisualsProgress { run_id, .. }
            | StudioEvent::VisualsFinished { run_id, .. }
            | StudioEvent::StageFailed { run_id, .. } => *run_id,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            StudioEvent::RunStarted { .. } => "run_started",
            StudioEvent::BlueprintReady { .. } => "blueprint_ready",
            StudioEvent::BlueprintFailed { .. } => "blueprint_failed",
            StudioEvent::AssetsLaunched { .. } => "assets_launched",
            StudioEvent::ThumbnailReady { .. } => "thumbnail_ready",
            StudioEvent::VoiceoverReady { .. } => "voiceover_ready",
            StudioEvent::ClipReady { .. } => "clip_ready",
            StudioEvent::VisualsProgress { .. } => "visuals_progress",
            StudioEvent::VisualsFinished { .. } => "visuals_finished",
            StudioEvent::StageFailed { .. } => "stage_failed",
        }
    }
}

/// State of the current production run. Only [`ProductionState::apply`] mutates it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductionState {
    pub run_id: Option<RunId>,
    pub topic: String,
    pub started_at: Option<DateTime<Utc>>,
    pub blueprint_status: StageStatus,
    pub blueprint: Option<Blueprint>,
    pub thumbnail_status: StageStatus,
    pub thumbnail: Option<Thumbnail>,
    pub voiceover_status: StageStatus,
    pub voiceover: Option<Voiceover>,
    pub visuals_status: StageStatus,
    pub visuals_message: Option<String>,
    pub clips: Vec<Clip>,
}

impl ProductionState {
    /// Apply one event. Returns false when the event belongs to another run or
    /// is not a valid transition from the current state; the state is then unchanged.
    pub fn apply(&mut self, event: StudioEvent) -> bool {
        if let StudioEvent::RunStarted { run_id, topic } = event {
            *self = ProductionState {
                run_id: Some(run_id),
                topic,
                started_at: Some(Utc::now()),
                blueprint_status: StageStatus::Loading,
                ..ProductionState::default()
            };
            return true;
        }

        if self.run_id != Some(event.run_id()) {
            tracing::debug!(
                "Session: ignoring {} from stale run {}",
                event.kind(),
                event.run_id()
            );
            return false;
        }

        let kind = event.kind();
        let applied = match event {
            StudioEvent::RunStarted { .. } => false,
            StudioEvent::BlueprintReady { blueprint, .. } => {
                if self.blueprint_status.is_loading() {
                    self.blueprint_status = StageStatus::Done;
                    self.blueprint = Some(blueprint);
                    true
                } else {
                    false
                }
            }
            StudioEvent::BlueprintFailed { message, .. } => {
                if self.blueprint_status.is_loading() {
                    self.blueprint_status = StageStatus::Error { message };
                    true
                } else {
                    false
                }
            }
            StudioEvent::AssetsLaunched { .. } => {
                let idle = AssetStage::ALL
                    .iter()
                    .all(|s| *self.status(*s) == StageStatus::Idle);
                if self.blueprint_status == StageStatus::Done && idle {
                    for stage in AssetStage::ALL {
                        *self.status_mut(stage) = StageStatus::Loading;
                    }
                    true
                } else {
                    false
                }
            }
            StudioEvent::ThumbnailReady { thumbnail, .. } => {
                if self.thumbnail_status.is_loading() {
                    self.thumbnail_status = StageStatus::Done;
                    self.thumbnail = Some(thumbnail);
                    true
                } else {
                    false
                }
            }
            StudioEvent::VoiceoverReady { voiceover, .. } => {
                if self.voiceover_status.is_loading() {
                    self.voiceover_status = StageStatus::Done;
                    self.voiceover = Some(voiceover);
                    true
                } else {
                    false
                }
            }
            StudioEvent::ClipReady { clip, .. } => {
                if self.visuals_status.is_loading() {
                    self.clips.push(clip);
                    true
                } else {
                    false
                }
            }
            StudioEvent::VisualsProgress { message, .. } => {
                if self.visuals_status.is_loading() {
                    self.visuals_message = Some(message);
                    true
                } else {
                    false
                }
            }
            StudioEvent::VisualsFinished { failure, .. } => {
                if self.visuals_status.is_loading() {
                    self.visuals_status = if self.clips.is_empty() {
                        StageStatus::Error {
                            message: failure.unwrap_or_else(|| NO_CLIPS_MESSAGE.to_string()),
                        }
                    } else {
                        StageStatus::Done
                    };
                    self.visuals_message = None;
                    true
                } else {
                    false
                }
            }
            StudioEvent::StageFailed { stage, message, .. } => {
                let status = self.status_mut(stage);
                if status.is_loading() {
                    *status = StageStatus::Error { message };
                    true
                } else {
                    false
                }
            }
        };

        if !applied {
            tracing::debug!("Session: rejected {} in current state", kind);
        }
        applied
    }

    pub fn status(&self, stage: AssetStage) -> &StageStatus {
        match stage {
            AssetStage::Thumbnail => &self.thumbnail_status,
            AssetStage::Voiceover => &self.voiceover_status,
            AssetStage::Visuals => &self.visuals_status,
        }
    }

    fn status_mut(&mut self, stage: AssetStage) -> &mut StageStatus {
        match stage {
            AssetStage::Thumbnail => &mut self.thumbnail_status,
            AssetStage::Voiceover => &mut self.voiceover_status,
            AssetStage::Visuals => &mut self.visuals_status,
        }
    }

    /// True once no further transition can happen for the current run.
    pub fn is_settled(&self) -> bool {
        if self.run_id.is_none() {
            return false;
        }
        match self.blueprint_status {
            StageStatus::Error { .. } => true,
            StageStatus::Done => AssetStage::ALL.iter().all(|s| self.status(*s).is_settled()),
            _ => false,
        }
    }

    /// Voiceover length when known, for the playback synchronizer.
    pub fn playback_duration(&self) -> Option<f64> {
        self.voiceover.as_ref().map(|v| v.duration_secs)
    }
}
