// genai/types.rs — Boundary types and error taxonomy for the generative API

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Inline media returned by a generation call (base64 data + MIME type)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineMedia {
    pub mime_type: String,
    pub data: String,
}

/// Base64 linear PCM from the speech model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechPayload {
    pub data: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Handle to a long-running video generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoOperation {
    pub name: String,
    pub done: bool,
    pub video_uri: Option<String>,
    pub error: Option<String>,
}

impl VideoOperation {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            video_uri: None,
            error: None,
        }
    }
}

/// Generative API errors, classified at the boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenAiError {
    #[error("No API key configured")]
    MissingCredential,

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Requested entity was not found: {0}")]
    EntityNotFound(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Operation still running after {attempts} polls")]
    PollExhausted { attempts: u32 },
}

impl GenAiError {
    /// Classify a failed response by status code, then by known substrings of its body.
    pub fn classify(status: Option<u16>, body: &str) -> Self {
        let message = summarize(body);
        match status {
            Some(429) => return GenAiError::Quota(message),
            Some(401) | Some(403) => return GenAiError::PermissionDenied(message),
            Some(404) => return GenAiError::EntityNotFound(message),
            _ => {}
        }

        if not_found_re().is_match(body) {
            GenAiError::EntityNotFound(message)
        } else if quota_re().is_match(body) {
            GenAiError::Quota(message)
        } else if permission_re().is_match(body) {
            GenAiError::PermissionDenied(message)
        } else {
            GenAiError::Api {
                status: status.unwrap_or(0),
                message,
            }
        }
    }

    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenAiError::Timeout
        } else if err.is_decode() {
            GenAiError::MalformedResponse(err.to_string())
        } else {
            GenAiError::Transport(err.to_string())
        }
    }

    /// Returns true if repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenAiError::Transport(_) | GenAiError::Timeout | GenAiError::Quota(_)
        )
    }

    /// Generic remediation text shown in the stage's error banner
    pub fn banner_message(&self) -> &'static str {
        match self {
            GenAiError::MissingCredential | GenAiError::EntityNotFound(_) => {
                "API key error. Please select a different key and try again."
            }
            GenAiError::PermissionDenied(_) => {
                "This key cannot access the model. Please select a key with access."
            }
            GenAiError::Quota(_) => "Quota exceeded. Wait a moment or switch keys, then try again.",
            GenAiError::Transport(_) | GenAiError::Timeout => {
                "Network problem. Check your connection and try again."
            }
            GenAiError::PollExhausted { .. } => "Rendering is taking too long. Please try again.",
            GenAiError::MalformedResponse(_)
            | GenAiError::Api { .. }
            | GenAiError::OperationFailed(_) => "Generation failed. Please try again.",
        }
    }
}

fn summarize(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > 300 {
        format!("{}...", trimmed.chars().take(300).collect::<String>())
    } else {
        trimmed.to_string()
    }
}

fn not_found_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Requested entity was not found").expect("valid not-found regex"))
}

fn quota_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)RESOURCE_EXHAUSTED|quota|rate limit|\b429\b").expect("valid quota regex")
    })
}

fn permission_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)PERMISSION_DENIED|API key not valid|UNAUTHENTICATED")
            .expect("valid permission regex")
    })
}
