use super::{AudioBuffer, AudioError};
use serde::{Deserialize, Serialize};

pub const WAV_HEADER_LEN: usize = 44;
pub const LEGACY_HEADER_RATE: u32 = 24_000;

const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = 2;
const PCM_FORMAT: u16 = 1;
const MONO: u16 = 1;

/// Highest rate whose byte rate (`rate * block_align`) still fits the header's u32.
pub const MAX_SAMPLE_RATE: u32 = u32::MAX / BLOCK_ALIGN as u32;

/// Sample rate written into the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WavHeaderRate {
    /// The decoded buffer's own sample rate.
    #[default]
    Buffer,
    /// A fixed rate regardless of the buffer, e.g. the 24 kHz header older players were built against.
    Fixed(u32),
}

impl WavHeaderRate {
    pub fn resolve(self, buffer: &AudioBuffer) -> u32 {
        match self {
            WavHeaderRate::Buffer => buffer.sample_rate,
            WavHeaderRate::Fixed(rate) => rate,
        }
    }

    /// Parses `buffer`, `fixed` (24 kHz) or an explicit rate such as `48000`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "buffer" | "source" => Some(WavHeaderRate::Buffer),
            "fixed" | "legacy" => Some(WavHeaderRate::Fixed(LEGACY_HEADER_RATE)),
            other => other
                .parse::<u32>()
                .ok()
                .filter(|rate| *rate > 0 && *rate <= MAX_SAMPLE_RATE)
                .map(WavHeaderRate::Fixed),
        }
    }
}

/// Convert a normalized sample to i16, clamping first. Negative values scale by
/// 32768 and positive by 32767 so +1.0 never overflows.
pub fn quantize(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}

/// Serialize channel 0 of `buffer` into a mono 16-bit PCM WAV file.
pub fn encode_wav(buffer: &AudioBuffer, header_rate: WavHeaderRate) -> Result<Vec<u8>, AudioError> {
    let samples = buffer.channel(0).unwrap_or(&[]);
    let sample_rate = header_rate.resolve(buffer);
    let byte_rate = sample_rate
        .checked_mul(BLOCK_ALIGN as u32)
        .ok_or_else(|| AudioError::InvalidFormat(format!("sample rate {} too high for WAV", sample_rate)))?;
    let data_size = u32::try_from(samples.len() * 2)
        .ok()
        .filter(|size| *size <= u32::MAX - 36)
        .ok_or_else(|| AudioError::InvalidFormat(format!("{} samples exceed WAV size limit", samples.len())))?;

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    wav.extend_from_slice(&MONO.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        wav.extend_from_slice(&quantize(sample).to_le_bytes());
    }

    Ok(wav)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode_pcm16;

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn read_u16(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    fn mono(sample_rate: u32, samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer {
            sample_rate,
            channels: 1,
            channel_data: vec![samples],
        }
    }

    #[test]
    fn test_layout_and_size() {
        let buffer = mono(24_000, vec![0.0; 250]);
        let wav = encode_wav(&buffer, WavHeaderRate::Buffer).unwrap();

        assert_eq!(wav.len(), 44 + 2 * 250);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(read_u32(&wav, 4), (wav.len() - 8) as u32);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(read_u32(&wav, 16), 16);
        assert_eq!(read_u16(&wav, 20), 1);
        assert_eq!(read_u16(&wav, 22), 1);
        assert_eq!(read_u16(&wav, 32), 2);
        assert_eq!(read_u16(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(read_u32(&wav, 40), 500);
    }

    #[test]
    fn test_only_channel_zero_is_written() {
        let buffer = AudioBuffer {
            sample_rate: 24_000,
            channels: 2,
            channel_data: vec![vec![0.5, 0.5], vec![-0.5, -0.5]],
        };
        let wav = encode_wav(&buffer, WavHeaderRate::Buffer).unwrap();

        assert_eq!(wav.len(), 48);
        assert_eq!(read_u16(&wav, 22), 1);
        assert_eq!(i16::from_le_bytes([wav[44], wav[45]]), 16383);
    }

    #[test]
    fn test_header_uses_buffer_rate_by_default() {
        let wav = encode_wav(&mono(16_000, vec![0.1]), WavHeaderRate::default()).unwrap();
        assert_eq!(read_u32(&wav, 24), 16_000);
        assert_eq!(read_u32(&wav, 28), 32_000);
    }

    #[test]
    fn test_fixed_header_ignores_buffer_rate() {
        let wav = encode_wav(&mono(16_000, vec![0.1]), WavHeaderRate::Fixed(LEGACY_HEADER_RATE)).unwrap();
        assert_eq!(read_u32(&wav, 24), 24_000);
        assert_eq!(read_u32(&wav, 28), 48_000);
    }

    #[test]
    fn test_out_of_range_samples_are_clamped() {
        assert_eq!(quantize(1.5), quantize(1.0));
        assert_eq!(quantize(-1.5), quantize(-1.0));
        assert_eq!(quantize(1.0), i16::MAX);
        assert_eq!(quantize(-1.0), i16::MIN);
    }

    #[test]
    fn test_empty_buffer_is_header_only() {
        let wav = encode_wav(&mono(24_000, Vec::new()), WavHeaderRate::Buffer).unwrap();
        assert_eq!(wav.len(), WAV_HEADER_LEN);
        assert_eq!(read_u32(&wav, 40), 0);
    }

    #[test]
    fn test_decode_then_encode_stays_within_one_step() {
        let original: Vec<i16> = (-50..50).map(|i| (i * 655) as i16).chain([i16::MIN, i16::MAX]).collect();
        let bytes: Vec<u8> = original.iter().flat_map(|s| s.to_le_bytes()).collect();

        let buffer = decode_pcm16(&bytes, 24_000, 1).unwrap();
        let wav = encode_wav(&buffer, WavHeaderRate::Buffer).unwrap();

        for (i, &expected) in original.iter().enumerate() {
            let offset = WAV_HEADER_LEN + i * 2;
            let actual = i16::from_le_bytes([wav[offset], wav[offset + 1]]);
            assert!(
                (actual as i32 - expected as i32).abs() <= 1,
                "sample {} drifted: {} -> {}",
                i,
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_parse_header_rate() {
        assert_eq!(WavHeaderRate::parse("buffer"), Some(WavHeaderRate::Buffer));
        assert_eq!(WavHeaderRate::parse("Legacy"), Some(WavHeaderRate::Fixed(24_000)));
        assert_eq!(WavHeaderRate::parse("44100"), Some(WavHeaderRate::Fixed(44_100)));
        assert_eq!(WavHeaderRate::parse("0"), None);
        assert_eq!(WavHeaderRate::parse("fast"), None);
        assert_eq!(WavHeaderRate::parse("3000000000"), None);
        assert_eq!(
            WavHeaderRate::parse(&MAX_SAMPLE_RATE.to_string()),
            Some(WavHeaderRate::Fixed(MAX_SAMPLE_RATE))
        );
    }

    #[test]
    fn test_rate_too_high_for_header_is_an_error() {
        let buffer = mono(3_000_000_000, vec![0.1]);
        assert!(matches!(
            encode_wav(&buffer, WavHeaderRate::Buffer),
            Err(AudioError::InvalidFormat(_))
        ));
        assert!(encode_wav(&mono(24_000, vec![0.1]), WavHeaderRate::Fixed(u32::MAX)).is_err());

        let wav = encode_wav(&mono(24_000, vec![0.1]), WavHeaderRate::Fixed(MAX_SAMPLE_RATE)).unwrap();
        assert_eq!(read_u32(&wav, 28), MAX_SAMPLE_RATE * 2);
    }
}
