use crate::blueprint::{self, prompts, Blueprint};
use crate::config::StudioConfig;
use crate::genai::{GeminiClient, GenAiError, MediaGenerator, TextGenerator};
use crate::session::{AssetStage, ProductionState, RunId, StateStore, StudioEvent};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use uuid::Uuid;

use self::metrics::StageMetrics;
use self::retry::PollPolicy;
use self::stages::StageError;

pub mod metrics;
pub mod poller;
pub mod retry;
pub mod stages;

const BLUEPRINT_STAGE: &str = "blueprint";
const CANCELLED_MESSAGE: &str = "Production was cancelled.";

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("Topic is empty")]
    EmptyTopic,

    #[error("Blueprint generation failed: {0}")]
    Blueprint(#[from] GenAiError),

    #[error("Run {0} was superseded by a newer run")]
    Superseded(RunId),
}

/// Shared handles a spawned stage task needs
#[derive(Clone)]
struct StageContext {
    media: Arc<dyn MediaGenerator>,
    config: Arc<StudioConfig>,
    store: Arc<StateStore>,
    metrics: Arc<Mutex<StageMetrics>>,
}

impl StageContext {
    fn record(&self, stage: &str, success: bool, started: Instant) {
        let elapsed = started.elapsed();
        if let Ok(mut metrics) = self.metrics.lock() {
            if success {
                metrics.record_success(stage, elapsed);
            } else {
                metrics.record_failure(stage, elapsed);
            }
        }
    }

    fn finish<T>(
        &self,
        run_id: RunId,
        stage: AssetStage,
        started: Instant,
        result: Result<T, StageError>,
        ready: impl FnOnce(T) -> StudioEvent,
    ) {
        match result {
            Ok(asset) => {
                tracing::info!("Studio: {} ready for run {}", stage, run_id);
                self.record(stage.as_str(), true, started);
                self.store.dispatch(ready(asset));
            }
            Err(e) => {
                tracing::warn!("Studio: {} failed for run {}: {}", stage, run_id, e);
                self.record(stage.as_str(), false, started);
                self.store.dispatch(StudioEvent::StageFailed {
                    run_id,
                    stage,
                    message: e.banner_message().to_string(),
                });
            }
        }
    }
}

/// Runs productions: blueprint first, then thumbnail, voiceover and clips in parallel.
///
/// Starting a new run aborts the previous run's asset tasks, and any event that
/// still arrives from an older run is discarded by the state reducer.
pub struct Studio {
    text: Arc<dyn TextGenerator>,
    ctx: StageContext,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Studio {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        media: Arc<dyn MediaGenerator>,
        config: StudioConfig,
    ) -> Self {
        tracing::info!(
            "Studio initialized: text={}, media={}, max_clips={}",
            text.name(),
            media.name(),
            config.max_clips
        );

        Self {
            text,
            ctx: StageContext {
                media,
                config: Arc::new(config),
                store: Arc::new(StateStore::new()),
                metrics: Arc::new(Mutex::new(StageMetrics::new())),
            },
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn from_gemini(client: GeminiClient, config: StudioConfig) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client, config)
    }

    pub fn config(&self) -> &StudioConfig {
        &self.ctx.config
    }

    /// Start a production run. Resolves once the blueprint is ready and the
    /// asset stages are launched; use [`Studio::settled`] to wait for the assets.
    pub async fn produce(&self, topic: &str) -> Result<RunId, StudioError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(StudioError::EmptyTopic);
        }

        let run_id = Uuid::new_v4();
        {
            let mut tasks = self.lock_tasks();
            let stale = tasks.len();
            for handle in tasks.drain(..) {
                handle.abort();
            }
            if stale > 0 {
                tracing::info!("Studio: aborted {} in-flight tasks from previous run", stale);
            }
            self.ctx.store.dispatch(StudioEvent::RunStarted {
                run_id,
                topic: topic.to_string(),
            });
        }
        tracing::info!("Studio: run {} started", run_id);

        let started = Instant::now();
        let blueprint = match self.generate_blueprint(topic).await {
            Ok(blueprint) => blueprint,
            Err(e) => {
                tracing::error!("Studio: blueprint for run {} failed: {}", run_id, e);
                self.ctx.record(BLUEPRINT_STAGE, false, started);
                self.ctx.store.dispatch(StudioEvent::BlueprintFailed {
                    run_id,
                    message: e.banner_message().to_string(),
                });
                return Err(StudioError::Blueprint(e));
            }
        };

        self.ctx.record(BLUEPRINT_STAGE, true, started);
        tracing::info!(
            "Studio: blueprint '{}' ready ({} segments)",
            blueprint.title,
            blueprint.segment_count()
        );

        let accepted = self.ctx.store.dispatch(StudioEvent::BlueprintReady {
            run_id,
            blueprint: blueprint.clone(),
        });
        if !accepted || !self.launch_assets(run_id, Arc::new(blueprint)) {
            tracing::info!("Studio: run {} superseded before assets launched", run_id);
            return Err(StudioError::Superseded(run_id));
        }

        Ok(run_id)
    }

    /// Abort the current run's in-flight asset tasks and mark every stage still
    /// loading as errored, so the run settles.
    pub fn cancel(&self) {
        let mut tasks = self.lock_tasks();
        for handle in tasks.drain(..) {
            handle.abort();
        }

        let state = self.ctx.store.snapshot();
        let Some(run_id) = state.run_id else {
            return;
        };
        if state.is_settled() {
            return;
        }

        if state.blueprint_status.is_loading() {
            self.ctx.store.dispatch(StudioEvent::BlueprintFailed {
                run_id,
                message: CANCELLED_MESSAGE.to_string(),
            });
        }
        for stage in AssetStage::ALL {
            if state.status(stage).is_loading() {
                self.ctx.store.dispatch(StudioEvent::StageFailed {
                    run_id,
                    stage,
                    message: CANCELLED_MESSAGE.to_string(),
                });
            }
        }
        tracing::info!("Studio: run {} cancelled", run_id);
    }

    pub fn snapshot(&self) -> ProductionState {
        self.ctx.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProductionState> {
        self.ctx.store.subscribe()
    }

    /// Wait until every stage of the current run is done or errored.
    pub async fn settled(&self) -> ProductionState {
        self.ctx.store.settled().await
    }

    pub fn metrics(&self) -> StageMetrics {
        self.ctx
            .metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    async fn generate_blueprint(&self, topic: &str) -> Result<Blueprint, GenAiError> {
        let prompt = prompts::blueprint_prompt(topic, &self.ctx.config.subject);
        let value = self
            .text
            .generate_structured(&prompt, &blueprint::blueprint_schema())
            .await?;
        blueprint::parse_blueprint(value)
    }

    fn launch_assets(&self, run_id: RunId, blueprint: Arc<Blueprint>) -> bool {
        let mut tasks = self.lock_tasks();
        if !self.ctx.store.dispatch(StudioEvent::AssetsLaunched { run_id }) {
            return false;
        }

        tasks.push(tokio::spawn(thumbnail_task(
            self.ctx.clone(),
            run_id,
            blueprint.clone(),
        )));
        tasks.push(tokio::spawn(voiceover_task(
            self.ctx.clone(),
            run_id,
            blueprint.clone(),
        )));
        tasks.push(tokio::spawn(visuals_task(self.ctx.clone(), run_id, blueprint)));
        true
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Studio {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn thumbnail_task(ctx: StageContext, run_id: RunId, blueprint: Arc<Blueprint>) {
    let started = Instant::now();
    let result = stages::render_thumbnail(ctx.media.as_ref(), &blueprint, &ctx.config.subject).await;
    ctx.finish(run_id, AssetStage::Thumbnail, started, result, |thumbnail| {
        StudioEvent::ThumbnailReady { run_id, thumbnail }
    });
}

async fn voiceover_task(ctx: StageContext, run_id: RunId, blueprint: Arc<Blueprint>) {
    let started = Instant::now();
    let result = stages::render_voiceover(
        ctx.media.as_ref(),
        &blueprint,
        &ctx.config.voice,
        ctx.config.wav_header_rate,
    )
    .await;
    ctx.finish(run_id, AssetStage::Voiceover, started, result, |voiceover| {
        StudioEvent::VoiceoverReady { run_id, voiceover }
    });
}

/// One clip per leading segment, up to `max_clips`, appended as each resolves.
async fn visuals_task(ctx: StageContext, run_id: RunId, blueprint: Arc<Blueprint>) {
    let started = Instant::now();
    let count = blueprint.segment_count().min(ctx.config.max_clips);
    let policy = PollPolicy::from_config(&ctx.config);

    ctx.store.dispatch(StudioEvent::VisualsProgress {
        run_id,
        message: format!("Rendering {} clips...", count),
    });

    let mut set = JoinSet::new();
    for index in 0..count {
        let media = ctx.media.clone();
        let blueprint = blueprint.clone();
        let subject = ctx.config.subject.clone();
        let policy = policy.clone();
        set.spawn(async move {
            let result =
                stages::render_clip(media.as_ref(), &blueprint, index, &subject, &policy).await;
            (index, result)
        });
    }

    let mut rendered = 0usize;
    let mut resolved = 0usize;
    let mut failure: Option<String> = None;

    while let Some(joined) = set.join_next().await {
        resolved += 1;
        match joined {
            Ok((index, Ok(clip))) => {
                tracing::info!("Studio: clip for segment {} ready", index);
                rendered += 1;
                ctx.store.dispatch(StudioEvent::ClipReady { run_id, clip });
            }
            Ok((index, Err(e))) => {
                tracing::warn!("Studio: clip for segment {} failed: {}", index, e);
                failure = Some(e.banner_message().to_string());
            }
            Err(e) => {
                tracing::warn!("Studio: clip task ended abnormally: {}", e);
                failure.get_or_insert_with(|| "Generation failed. Please try again.".to_string());
            }
        }
        ctx.store.dispatch(StudioEvent::VisualsProgress {
            run_id,
            message: format!("{}/{} clips resolved", resolved, count),
        });
    }

    ctx.record(AssetStage::Visuals.as_str(), rendered > 0, started);
    tracing::info!("Studio: visuals finished for run {}: {}/{} clips", run_id, rendered, count);
    ctx.store.dispatch(StudioEvent::VisualsFinished { run_id, failure });
}
