pub mod buffer;
pub mod pcm;
pub mod wav;

pub use buffer::AudioBuffer;
pub use pcm::{decode_base64_pcm, decode_pcm16};
pub use wav::{encode_wav, WavHeaderRate, MAX_SAMPLE_RATE};

/// Audio pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Invalid base64 audio payload: {0}")]
    InvalidBase64(String),

    #[error("Invalid audio format: {0}")]
    InvalidFormat(String),
}
