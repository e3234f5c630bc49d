use crate::audio::WavHeaderRate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_VOICE: &str = "Kore";
pub const DEFAULT_SUBJECT: &str = "Java";
pub const DEFAULT_OUTPUT_DIR: &str = "studio-output";
pub const DEFAULT_MAX_CLIPS: usize = 3;
pub const DEFAULT_FALLBACK_DURATION_SECS: f64 = 60.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub speech_model: String,
    pub video_model: String,
    pub voice: String,
    /// Language the videos teach, e.g. "Java" or "Rust"
    pub subject: String,
    pub max_clips: usize,
    pub poll_initial_delay_secs: u64,
    pub poll_max_delay_secs: u64,
    pub poll_max_attempts: u32,
    pub fallback_duration_secs: f64,
    pub wav_header_rate: WavHeaderRate,
    pub request_timeout_secs: u64,
    pub output_dir: PathBuf,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            max_clips: DEFAULT_MAX_CLIPS,
            poll_initial_delay_secs: 10,
            poll_max_delay_secs: 60,
            poll_max_attempts: 30,
            fallback_duration_secs: DEFAULT_FALLBACK_DURATION_SECS,
            wav_header_rate: WavHeaderRate::Buffer,
            request_timeout_secs: 120,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl StudioConfig {
    pub fn poll_initial_delay(&self) -> Duration {
        Duration::from_secs(self.poll_initial_delay_secs)
    }

    pub fn poll_max_delay(&self) -> Duration {
        Duration::from_secs(self.poll_max_delay_secs)
    }
}

/// Load the optional JSON file at `path`, then apply environment overrides.
pub fn load(path: Option<&Path>) -> Result<StudioConfig, ConfigError> {
    let mut config = match path {
        Some(path) if path.exists() => read_file(path)?,
        Some(path) => {
            tracing::info!("Config file {} not found, using defaults", path.display());
            StudioConfig::default()
        }
        None => StudioConfig::default(),
    };

    apply_env(&mut config, |key| env::var(key).ok())?;
    normalize(&mut config);
    Ok(config)
}

fn read_file(path: &Path) -> Result<StudioConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env<F>(config: &mut StudioConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")) {
        config.api_key = Some(key);
    }
    if let Some(model) = non_empty("STUDIO_TEXT_MODEL") {
        config.text_model = model;
    }
    if let Some(model) = non_empty("STUDIO_IMAGE_MODEL") {
        config.image_model = model;
    }
    if let Some(model) = non_empty("STUDIO_SPEECH_MODEL") {
        config.speech_model = model;
    }
    if let Some(model) = non_empty("STUDIO_VIDEO_MODEL") {
        config.video_model = model;
    }
    if let Some(voice) = non_empty("STUDIO_VOICE") {
        config.voice = voice;
    }
    if let Some(subject) = non_empty("STUDIO_SUBJECT") {
        config.subject = subject;
    }
    if let Some(dir) = non_empty("STUDIO_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    if let Some(value) = non_empty("STUDIO_MAX_CLIPS") {
        config.max_clips = value.parse().map_err(|_| ConfigError::InvalidEnv {
            key: "STUDIO_MAX_CLIPS".to_string(),
            value,
        })?;
    }
    if let Some(value) = non_empty("STUDIO_WAV_HEADER_RATE") {
        config.wav_header_rate =
            WavHeaderRate::parse(&value).ok_or_else(|| ConfigError::InvalidEnv {
                key: "STUDIO_WAV_HEADER_RATE".to_string(),
                value,
            })?;
    }

    Ok(())
}

fn normalize(config: &mut StudioConfig) {
    config.api_key = config
        .api_key
        .take()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    if config.voice.trim().is_empty() {
        config.voice = DEFAULT_VOICE.to_string();
    }
    if config.subject.trim().is_empty() {
        config.subject = DEFAULT_SUBJECT.to_string();
    }
    if !config.fallback_duration_secs.is_finite() || config.fallback_duration_secs <= 0.0 {
        config.fallback_duration_secs = DEFAULT_FALLBACK_DURATION_SECS;
    }
    config.poll_initial_delay_secs = config.poll_initial_delay_secs.max(1);
    config.poll_max_delay_secs = config.poll_max_delay_secs.max(config.poll_initial_delay_secs);
    config.poll_max_attempts = config.poll_max_attempts.max(1);
    config.request_timeout_secs = config.request_timeout_secs.max(1);
}

/// First 6 and last 4 characters of the key, for logs.
pub fn mask_api_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 10 {
        return "******".to_string();
    }

    let prefix: String = chars[..6].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}********{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_defaults() {
        let mut config = StudioConfig::default();
        apply_env(
            &mut config,
            env_of(&[
                ("API_KEY", "AIzaSyFallback"),
                ("STUDIO_VOICE", "Puck"),
                ("STUDIO_MAX_CLIPS", "5"),
                ("STUDIO_WAV_HEADER_RATE", "legacy"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("AIzaSyFallback"));
        assert_eq!(config.voice, "Puck");
        assert_eq!(config.max_clips, 5);
        assert_eq!(config.wav_header_rate, WavHeaderRate::Fixed(24_000));
    }

    #[test]
    fn test_gemini_key_wins_over_generic_key() {
        let mut config = StudioConfig::default();
        apply_env(
            &mut config,
            env_of(&[("GEMINI_API_KEY", "primary"), ("API_KEY", "secondary")]),
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let mut config = StudioConfig::default();
        let err = apply_env(&mut config, env_of(&[("STUDIO_MAX_CLIPS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key, .. } if key == "STUDIO_MAX_CLIPS"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: StudioConfig =
            serde_json::from_str(r#"{ "subject": "Rust", "wav_header_rate": { "fixed": 24000 } }"#)
                .unwrap();
        assert_eq!(config.subject, "Rust");
        assert_eq!(config.wav_header_rate, WavHeaderRate::Fixed(24_000));
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
    }

    #[test]
    fn test_normalize_repairs_bad_values() {
        let mut config = StudioConfig {
            api_key: Some("  ".to_string()),
            voice: String::new(),
            fallback_duration_secs: -1.0,
            poll_initial_delay_secs: 0,
            poll_max_delay_secs: 0,
            poll_max_attempts: 0,
            ..StudioConfig::default()
        };
        normalize(&mut config);

        assert!(config.api_key.is_none());
        assert_eq!(config.voice, DEFAULT_VOICE);
        assert_eq!(config.fallback_duration_secs, DEFAULT_FALLBACK_DURATION_SECS);
        assert_eq!(config.poll_initial_delay_secs, 1);
        assert_eq!(config.poll_max_delay_secs, 1);
        assert_eq!(config.poll_max_attempts, 1);
    }

    #[test]
    fn test_api_key_is_never_serialized() {
        let config = StudioConfig {
            api_key: Some("secret-key-value".to_string()),
            ..StudioConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-key-value"));
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("short"), "******");
        assert_eq!(mask_api_key("AIzaSyABCDEFGH1234"), "AIzaSy********1234");
        assert_eq!(mask_api_key("aééééééééé1234"), "aééééé********1234");
        assert_eq!(mask_api_key("ééééééééé"), "******");
    }
}
