use super::{effective_duration, FALLBACK_DURATION_SECS};
use crate::blueprint::ScriptSegment;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub index: usize,
    pub start_secs: f64,
    pub end_secs: f64,
    /// Timestamp label from the script
    pub label: String,
}

/// Uniform playback window for every segment, matching [`super::active_segment_index`]
/// given the same total and fallback.
pub fn timeline(
    total_duration_secs: Option<f64>,
    segments: &[ScriptSegment],
    fallback_secs: f64,
) -> Vec<TimelineEntry> {
    if segments.is_empty() {
        return Vec::new();
    }

    let fallback = effective_duration(Some(fallback_secs), FALLBACK_DURATION_SECS);
    let total = effective_duration(total_duration_secs, fallback);
    let step = total / segments.len() as f64;

    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| TimelineEntry {
            index,
            start_secs: step * index as f64,
            end_secs: if index + 1 == segments.len() {
                total
            } else {
                step * (index + 1) as f64
            },
            label: segment.timestamp.clone(),
        })
        .collect()
}
