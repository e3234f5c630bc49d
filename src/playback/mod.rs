// playback/mod.rs — Maps voiceover playback time onto script segments and clips

mod timeline;

pub use timeline::{timeline, TimelineEntry};

use serde::{Deserialize, Serialize};

/// Used until the player has loaded the voiceover's metadata.
pub const FALLBACK_DURATION_SECS: f64 = 60.0;

/// A generated video clip, in the order it resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub url: String,
    pub title: String,
    /// Script segment the clip was generated for
    pub segment_index: usize,
}

impl Clip {
    /// Download URL with the API key attached, as the media element fetches it directly.
    pub fn authorized_url(&self, api_key: &str) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}key={}", self.url, separator, api_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PlaybackState {
    pub current_time_secs: f64,
    /// `None` until the duration is known
    pub total_duration_secs: Option<f64>,
}

impl PlaybackState {
    pub fn new(current_time_secs: f64, total_duration_secs: Option<f64>) -> Self {
        Self {
            current_time_secs,
            total_duration_secs,
        }
    }

    pub fn effective_duration(&self, fallback_secs: f64) -> f64 {
        effective_duration(self.total_duration_secs, fallback_secs)
    }
}

pub(crate) fn effective_duration(total: Option<f64>, fallback_secs: f64) -> f64 {
    match total {
        Some(d) if d.is_finite() && d > 0.0 => d,
        _ => fallback_secs,
    }
}

/// `min(floor(t / (total / n)), n - 1)`, or `None` when there are no segments.
///
/// A non-finite or non-positive total is replaced by `fallback_secs`.
pub fn active_segment_index(
    current_time_secs: f64,
    total_duration_secs: f64,
    segment_count: usize,
    fallback_secs: f64,
) -> Option<usize> {
    if segment_count == 0 {
        return None;
    }

    let fallback = effective_duration(Some(fallback_secs), FALLBACK_DURATION_SECS);
    let total = effective_duration(Some(total_duration_secs), fallback);
    let current = if current_time_secs.is_finite() {
        current_time_secs.max(0.0)
    } else if current_time_secs == f64::INFINITY {
        total
    } else {
        0.0
    };

    let segment_duration = total / segment_count as f64;
    let index = (current / segment_duration).floor() as usize;
    Some(index.min(segment_count - 1))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipSelection<'a> {
    Clip { index: usize, clip: &'a Clip },
    /// No clip has resolved yet
    Loading,
}

/// Clips repeat cyclically when there are fewer clips than segments.
pub fn select_clip(active_index: usize, clips: &[Clip]) -> ClipSelection<'_> {
    if clips.is_empty() {
        return ClipSelection::Loading;
    }
    let index = active_index % clips.len();
    ClipSelection::Clip {
        index,
        clip: &clips[index],
    }
}

/// What the overlay shows for one time update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncFrame {
    pub segment_index: usize,
    /// `None` while clips are loading
    pub clip_index: Option<usize>,
    /// Displayed clip changed since the previous update (crossfade cue)
    pub transition: bool,
}

/// Recomputed on every playback time update. Only the last displayed clip is
/// remembered, and only to flag transitions.
#[derive(Debug, Clone)]
pub struct PlaybackSynchronizer {
    segment_count: usize,
    fallback_duration_secs: f64,
    last_clip: Option<usize>,
}

impl PlaybackSynchronizer {
    pub fn new(segment_count: usize) -> Self {
        Self::with_fallback(segment_count, FALLBACK_DURATION_SECS)
    }

    pub fn with_fallback(segment_count: usize, fallback_duration_secs: f64) -> Self {
        Self {
            segment_count,
            fallback_duration_secs: effective_duration(
                Some(fallback_duration_secs),
                FALLBACK_DURATION_SECS,
            ),
            last_clip: None,
        }
    }

    pub fn on_time_update(&mut self, state: &PlaybackState, clips: &[Clip]) -> Option<SyncFrame> {
        let total = state.total_duration_secs.unwrap_or(f64::NAN);
        let segment_index = active_segment_index(
            state.current_time_secs,
            total,
            self.segment_count,
            self.fallback_duration_secs,
        )?;

        let clip_index = match select_clip(segment_index, clips) {
            ClipSelection::Clip { index, .. } => Some(index),
            ClipSelection::Loading => None,
        };

        let transition = clip_index.is_some() && clip_index != self.last_clip;
        if clip_index.is_some() {
            self.last_clip = clip_index;
        }

        Some(SyncFrame {
            segment_index,
            clip_index,
            transition,
        })
    }

    pub fn reset(&mut self) {
        self.last_clip = None;
    }
}
