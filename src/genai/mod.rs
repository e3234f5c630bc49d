// genai/mod.rs — Collaborator interfaces for the generative API

mod gemini;
mod types;

pub use gemini::GeminiClient;
pub use types::{GenAiError, InlineMedia, SpeechPayload, VideoOperation};

use async_trait::async_trait;
use serde_json::Value;

/// Structured text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate JSON matching `schema` for `prompt`
    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<Value, GenAiError>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Image, speech and video generation
#[async_trait]
pub trait MediaGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<InlineMedia, GenAiError>;

    async fn generate_speech(&self, prompt: &str, voice: &str) -> Result<SpeechPayload, GenAiError>;

    /// Submit a video generation and return its operation handle
    async fn start_video(&self, prompt: &str) -> Result<VideoOperation, GenAiError>;

    /// Re-query an operation's status
    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenAiError>;

    fn name(&self) -> &str;
}
