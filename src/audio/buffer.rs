use serde::{Deserialize, Serialize};

/// Normalized, de-interleaved audio. Every channel holds `frame_count` samples in [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: u16,
    pub channel_data: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: u16, frame_count: usize) -> Self {
        Self {
            sample_rate,
            channels,
            channel_data: vec![vec![0.0; frame_count]; channels as usize],
        }
    }

    pub fn frame_count(&self) -> usize {
        self.channel_data.first().map(Vec::len).unwrap_or(0)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channel_data.get(index).map(Vec::as_slice)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_silent() {
        let buffer = AudioBuffer::new(24_000, 2, 480);
        assert_eq!(buffer.channel_data.len(), 2);
        assert_eq!(buffer.frame_count(), 480);
        assert!(buffer.channel_data.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn test_duration_uses_frames_not_samples() {
        let buffer = AudioBuffer::new(24_000, 2, 12_000);
        assert!((buffer.duration_secs() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_rate_has_no_duration() {
        let buffer = AudioBuffer::new(0, 1, 100);
        assert_eq!(buffer.duration_secs(), 0.0);
    }
}
