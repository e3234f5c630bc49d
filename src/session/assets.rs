use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Thumbnail {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64_STANDARD.encode(&self.bytes))
    }

    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        }
    }
}

/// Playable voiceover: a mono WAV file plus what the player needs to know about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Voiceover {
    #[serde(skip)]
    pub wav: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
    pub frame_count: usize,
    pub duration_secs: f64,
}
