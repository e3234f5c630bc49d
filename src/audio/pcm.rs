use super::{AudioBuffer, AudioError, MAX_SAMPLE_RATE};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

const I16_SCALE: f32 = 32768.0;

/// Decode a base64 payload of signed 16-bit little-endian interleaved PCM.
pub fn decode_base64_pcm(
    data: &str,
    sample_rate: u32,
    channels: u16,
) -> Result<AudioBuffer, AudioError> {
    let bytes = BASE64_STANDARD
        .decode(data.trim())
        .map_err(|e| AudioError::InvalidBase64(e.to_string()))?;
    decode_pcm16(&bytes, sample_rate, channels)
}

/// Split interleaved i16 LE samples into one normalized channel per stream.
///
/// A trailing odd byte or partial frame is dropped.
pub fn decode_pcm16(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<AudioBuffer, AudioError> {
    if channels == 0 {
        return Err(AudioError::InvalidFormat("channel count must be positive".into()));
    }
    if sample_rate == 0 || sample_rate > MAX_SAMPLE_RATE {
        return Err(AudioError::InvalidFormat(format!("unsupported sample rate {}", sample_rate)));
    }

    let total_samples = bytes.len() / 2;
    let channel_count = channels as usize;
    let frame_count = total_samples / channel_count;

    let dropped_bytes = bytes.len() - frame_count * channel_count * 2;
    if dropped_bytes > 0 {
        tracing::debug!(
            "PCM: dropping {} trailing bytes that do not form a full frame",
            dropped_bytes
        );
    }

    let mut buffer = AudioBuffer::new(sample_rate, channels, frame_count);
    for (c, channel) in buffer.channel_data.iter_mut().enumerate() {
        for (i, slot) in channel.iter_mut().enumerate() {
            let offset = (i * channel_count + c) * 2;
            let sample = i16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
            *slot = sample as f32 / I16_SCALE;
        }
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_deinterleaves_stereo() {
        let bytes = le_bytes(&[16384, -16384, 0, 32767, -32768, 8192]);
        let buffer = decode_pcm16(&bytes, 24_000, 2).unwrap();

        assert_eq!(buffer.frame_count(), 3);
        assert_eq!(buffer.channel(0).unwrap(), &[0.5, 0.0, -1.0]);
        assert_eq!(buffer.channel(1).unwrap(), &[-0.5, 32767.0 / 32768.0, 0.25]);
    }

    #[test]
    fn test_every_channel_has_frame_count_samples_in_range() {
        let samples: Vec<i16> = (0..300).map(|i| (i * 219 - 32768) as i16).collect();
        let buffer = decode_pcm16(&le_bytes(&samples), 16_000, 3).unwrap();

        assert_eq!(buffer.channel_data.len(), 3);
        for channel in &buffer.channel_data {
            assert_eq!(channel.len(), 100);
            assert!(channel.iter().all(|&s| (-1.0..1.0).contains(&s)));
        }
    }

    #[test]
    fn test_truncates_partial_frame_and_odd_byte() {
        let mut bytes = le_bytes(&[1000, 2000, 3000]);
        bytes.push(0x7f);
        let buffer = decode_pcm16(&bytes, 24_000, 2).unwrap();

        assert_eq!(buffer.frame_count(), 1);
        assert_eq!(buffer.channel(0).unwrap(), &[1000.0 / 32768.0]);
        assert_eq!(buffer.channel(1).unwrap(), &[2000.0 / 32768.0]);
    }

    #[test]
    fn test_empty_input_is_an_empty_buffer() {
        let buffer = decode_pcm16(&[], 24_000, 1).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.channel_data.len(), 1);
    }

    #[test]
    fn test_zero_channels_is_rejected() {
        let result = decode_pcm16(&[0, 0], 24_000, 0);
        assert!(matches!(result, Err(AudioError::InvalidFormat(_))));
    }

    #[test]
    fn test_rate_outside_header_range_is_rejected() {
        assert!(decode_pcm16(&[0, 0], 0, 1).is_err());
        assert!(decode_pcm16(&[0, 0], 3_000_000_000, 1).is_err());
        assert!(decode_pcm16(&[0, 0], MAX_SAMPLE_RATE, 1).is_ok());
    }

    #[test]
    fn test_base64_payload_is_decoded() {
        let encoded = BASE64_STANDARD.encode(le_bytes(&[-32768, 16384]));
        let buffer = decode_base64_pcm(&encoded, 24_000, 1).unwrap();
        assert_eq!(buffer.channel(0).unwrap(), &[-1.0, 0.5]);
    }

    #[test]
    fn test_malformed_base64_is_a_decode_error() {
        let result = decode_base64_pcm("not*base64!", 24_000, 1);
        assert!(matches!(result, Err(AudioError::InvalidBase64(_))));
    }
}
