use super::poller::poll_until_done;
use super::retry::PollPolicy;
use crate::audio::{self, AudioError, WavHeaderRate};
use crate::blueprint::{prompts, Blueprint};
use crate::genai::{GenAiError, MediaGenerator};
use crate::playback::Clip;
use crate::session::{Thumbnail, Voiceover};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

const CLIP_TITLE_MAX_CHARS: usize = 60;

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    GenAi(#[from] GenAiError),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

impl StageError {
    pub fn banner_message(&self) -> &'static str {
        match self {
            StageError::GenAi(e) => e.banner_message(),
            StageError::Audio(_) => "The voiceover audio could not be decoded. Please try again.",
        }
    }
}

pub async fn render_thumbnail(
    media: &dyn MediaGenerator,
    blueprint: &Blueprint,
    subject: &str,
) -> Result<Thumbnail, StageError> {
    let image = media
        .generate_image(&prompts::thumbnail_prompt(blueprint, subject))
        .await?;

    let bytes = BASE64_STANDARD
        .decode(image.data.trim())
        .map_err(|e| GenAiError::MalformedResponse(format!("thumbnail data: {}", e)))?;

    Ok(Thumbnail {
        mime_type: image.mime_type,
        bytes,
    })
}

/// Speech → base64 PCM → de-interleaved buffer → mono WAV.
pub async fn render_voiceover(
    media: &dyn MediaGenerator,
    blueprint: &Blueprint,
    voice: &str,
    header_rate: WavHeaderRate,
) -> Result<Voiceover, StageError> {
    let payload = media
        .generate_speech(&prompts::narration_prompt(blueprint), voice)
        .await?;

    let buffer = audio::decode_base64_pcm(&payload.data, payload.sample_rate, payload.channels)?;
    let wav = audio::encode_wav(&buffer, header_rate)?;

    tracing::info!(
        "Voiceover: {} frames at {} Hz ({:.1}s, {} bytes)",
        buffer.frame_count(),
        buffer.sample_rate,
        buffer.duration_secs(),
        wav.len()
    );

    Ok(Voiceover {
        wav,
        sample_rate: buffer.sample_rate,
        channels: buffer.channels,
        frame_count: buffer.frame_count(),
        duration_secs: buffer.duration_secs(),
    })
}

pub async fn render_clip(
    media: &dyn MediaGenerator,
    blueprint: &Blueprint,
    segment_index: usize,
    subject: &str,
    policy: &PollPolicy,
) -> Result<Clip, StageError> {
    let segment = blueprint.script.get(segment_index).ok_or_else(|| {
        GenAiError::MalformedResponse(format!("no script segment {}", segment_index))
    })?;

    let operation = media
        .start_video(&prompts::clip_prompt(blueprint, segment, subject))
        .await?;
    let url = poll_until_done(media, operation, policy).await?;

    Ok(Clip {
        url,
        title: clip_title(&segment.visual, segment_index),
        segment_index,
    })
}

fn clip_title(visual: &str, segment_index: usize) -> String {
    let visual = visual.trim();
    if visual.is_empty() {
        return format!("Scene {}", segment_index + 1);
    }
    if visual.chars().count() > CLIP_TITLE_MAX_CHARS {
        let cut: String = visual.chars().take(CLIP_TITLE_MAX_CHARS).collect();
        format!("{}...", cut.trim_end())
    } else {
        visual.to_string()
    }
}
