pub mod audio;
pub mod blueprint;
pub mod config;
pub mod genai;
pub mod orchestrator;
pub mod playback;
pub mod session;

pub use audio::{decode_base64_pcm, decode_pcm16, encode_wav, AudioBuffer, WavHeaderRate};
pub use blueprint::{Blueprint, ScriptSegment};
pub use config::StudioConfig;
pub use genai::{GeminiClient, GenAiError, MediaGenerator, TextGenerator};
pub use orchestrator::{Studio, StudioError};
pub use playback::{active_segment_index, select_clip, Clip, PlaybackState, PlaybackSynchronizer};
pub use session::{AssetStage, ProductionState, StageStatus};

use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "studio.json";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

async fn produce_to_disk(topic: &str) -> Result<(), String> {
    let config_path = std::env::var("STUDIO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = config::load(Some(&config_path)).map_err(|e| e.to_string())?;

    let client = GeminiClient::from_config(&config)
        .map_err(|e| format!("{} ({})", e.banner_message(), e))?;
    let api_key = client.api_key().to_string();
    let studio = Studio::from_gemini(client, config);

    studio.produce(topic).await.map_err(|e| e.to_string())?;
    let state = studio.settled().await;

    let metrics = studio.metrics();
    for stage in AssetStage::ALL {
        if let StageStatus::Error { message } = state.status(stage) {
            tracing::warn!("{}: {}", stage, message);
        }
        if let Some(took) = metrics.last_duration(stage.as_str()) {
            tracing::info!("{} took {:.1}s", stage, took.as_secs_f64());
        }
    }

    write_outputs(&studio.config().output_dir, &state).await?;
    log_playback_plan(&state, studio.config().fallback_duration_secs);

    for clip in &state.clips {
        println!("{}: {}", clip.title, clip.authorized_url(&api_key));
    }
    Ok(())
}

async fn write_outputs(dir: &Path, state: &ProductionState) -> Result<(), String> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;

    let mut files: Vec<(PathBuf, Vec<u8>)> = Vec::new();

    let summary = serde_json::to_vec_pretty(state)
        .map_err(|e| format!("Failed to serialize production: {}", e))?;
    files.push((dir.join("production.json"), summary));

    if let Some(blueprint) = &state.blueprint {
        let json = serde_json::to_vec_pretty(blueprint)
            .map_err(|e| format!("Failed to serialize blueprint: {}", e))?;
        files.push((dir.join("blueprint.json"), json));
    }
    if let Some(thumbnail) = &state.thumbnail {
        let name = format!("thumbnail.{}", thumbnail.file_extension());
        files.push((dir.join(name), thumbnail.bytes.clone()));
    }
    if let Some(voiceover) = &state.voiceover {
        files.push((dir.join("voiceover.wav"), voiceover.wav.clone()));
    }

    for (path, bytes) in files {
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        tracing::info!("Saved {}", path.display());
    }
    Ok(())
}

/// Walk the voiceover once, segment by segment, the way the player overlay would.
fn log_playback_plan(state: &ProductionState, fallback_duration_secs: f64) {
    let Some(blueprint) = &state.blueprint else {
        return;
    };

    let duration = state.playback_duration();
    let mut sync = PlaybackSynchronizer::with_fallback(blueprint.segment_count(), fallback_duration_secs);

    for entry in playback::timeline(duration, &blueprint.script, fallback_duration_secs) {
        let position = PlaybackState::new(entry.start_secs, duration);
        let Some(frame) = sync.on_time_update(&position, &state.clips) else {
            continue;
        };
        let shown = frame
            .clip_index
            .and_then(|i| state.clips.get(i))
            .map(|c| c.title.as_str())
            .unwrap_or("loading");
        tracing::info!(
            "[{:>6.1}s - {:>6.1}s] {} segment {} -> {}",
            entry.start_secs,
            entry.end_secs,
            entry.label,
            frame.segment_index + 1,
            shown
        );
    }
}

pub fn run() {
    // Load environment variables from .env file
    let _ = dotenvy::dotenv();
    init_tracing();

    let topic = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if topic.trim().is_empty() {
        eprintln!("usage: devcast-studio <topic>");
        std::process::exit(2);
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(produce_to_disk(&topic)) {
        tracing::error!("Production failed: {}", e);
        std::process::exit(1);
    }
}
