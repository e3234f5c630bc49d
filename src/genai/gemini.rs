// genai/gemini.rs — Google Generative Language REST adapter

use super::{GenAiError, InlineMedia, MediaGenerator, SpeechPayload, TextGenerator, VideoOperation};
use crate::audio::MAX_SAMPLE_RATE;
use crate::config::{mask_api_key, StudioConfig};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_SPEECH_RATE: u32 = 24_000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<Value>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResult>,
    error: Option<OperationError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GeneratedVideos>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedVideos {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Deserialize)]
struct GeneratedSample {
    video: Option<VideoFile>,
}

#[derive(Deserialize)]
struct VideoFile {
    uri: Option<String>,
}

#[derive(Deserialize)]
struct OperationError {
    #[serde(default)]
    message: String,
}

impl GenerateResponse {
    fn parts(self) -> impl Iterator<Item = CandidatePart> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
    }
}

impl From<OperationResponse> for VideoOperation {
    fn from(op: OperationResponse) -> Self {
        let video_uri = op
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|v| v.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);

        VideoOperation {
            name: op.name,
            done: op.done,
            video_uri,
            error: op.error.map(|e| e.message),
        }
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
    speech_model: String,
    video_model: String,
}

impl GeminiClient {
    pub fn from_config(config: &StudioConfig) -> Result<Self, GenAiError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(GenAiError::MissingCredential)?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        tracing::info!(
            "Gemini client initialized (key {}, text model {})",
            mask_api_key(&api_key),
            config.text_model
        );

        Ok(Self {
            client,
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            speech_model: config.speech_model.clone(),
            video_model: config.video_model.clone(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        generation_config: GenerationConfig,
    ) -> Result<GenerateResponse, GenAiError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        };

        let response = self
            .client
            .post(self.model_url(model, "generateContent"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(GenAiError::from_reqwest)?;

        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GenAiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GenAiError::classify(Some(status.as_u16()), &body));
    }

    let body = response.text().await.map_err(GenAiError::from_reqwest)?;
    serde_json::from_str(&body).map_err(|e| GenAiError::MalformedResponse(e.to_string()))
}

fn parse_sample_rate(mime_type: &str) -> u32 {
    static RATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = RATE_RE.get_or_init(|| Regex::new(r"rate=(\d+)").expect("valid rate regex"));
    re.captures(mime_type)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|rate| *rate > 0 && *rate <= MAX_SAMPLE_RATE)
        .unwrap_or(DEFAULT_SPEECH_RATE)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<Value, GenAiError> {
        let response = self
            .generate_content(
                &self.text_model,
                prompt,
                GenerationConfig {
                    response_mime_type: Some("application/json".to_string()),
                    response_schema: Some(schema.clone()),
                    ..Default::default()
                },
            )
            .await?;

        let text = response
            .parts()
            .find_map(|p| p.text)
            .ok_or_else(|| GenAiError::MalformedResponse("no text part in response".into()))?;

        serde_json::from_str(&text).map_err(|e| GenAiError::MalformedResponse(e.to_string()))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[async_trait]
impl MediaGenerator for GeminiClient {
    async fn generate_image(&self, prompt: &str) -> Result<InlineMedia, GenAiError> {
        let response = self
            .generate_content(
                &self.image_model,
                prompt,
                GenerationConfig {
                    response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
                    image_config: Some(json!({ "aspectRatio": "16:9", "imageSize": "4K" })),
                    ..Default::default()
                },
            )
            .await?;

        response
            .parts()
            .find_map(|p| p.inline_data)
            .map(|d| InlineMedia {
                mime_type: d.mime_type,
                data: d.data,
            })
            .ok_or_else(|| GenAiError::MalformedResponse("no image in response".into()))
    }

    async fn generate_speech(&self, prompt: &str, voice: &str) -> Result<SpeechPayload, GenAiError> {
        let response = self
            .generate_content(
                &self.speech_model,
                prompt,
                GenerationConfig {
                    response_modalities: Some(vec!["AUDIO".to_string()]),
                    speech_config: Some(json!({
                        "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": voice } }
                    })),
                    ..Default::default()
                },
            )
            .await?;

        let audio = response
            .parts()
            .find_map(|p| p.inline_data)
            .ok_or_else(|| GenAiError::MalformedResponse("no audio in response".into()))?;

        Ok(SpeechPayload {
            sample_rate: parse_sample_rate(&audio.mime_type),
            channels: 1,
            data: audio.data,
        })
    }

    async fn start_video(&self, prompt: &str) -> Result<VideoOperation, GenAiError> {
        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": { "aspectRatio": "16:9", "resolution": "720p" }
        });

        let response = self
            .client
            .post(self.model_url(&self.video_model, "predictLongRunning"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(GenAiError::from_reqwest)?;

        let operation: OperationResponse = read_json(response).await?;
        tracing::info!("Gemini: video operation submitted: {}", operation.name);
        Ok(operation.into())
    }

    async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenAiError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, operation.name))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(GenAiError::from_reqwest)?;

        let operation: OperationResponse = read_json(response).await?;
        Ok(operation.into())
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rate_from_mime_type() {
        assert_eq!(parse_sample_rate("audio/L16;codec=pcm;rate=24000"), 24_000);
        assert_eq!(parse_sample_rate("audio/L16;rate=16000"), 16_000);
        assert_eq!(parse_sample_rate("audio/L16"), DEFAULT_SPEECH_RATE);
        assert_eq!(parse_sample_rate("audio/L16;rate=3000000000"), DEFAULT_SPEECH_RATE);
    }

    #[test]
    fn test_finished_operation_exposes_uri() {
        let raw = r#"{
            "name": "models/veo/operations/abc",
            "done": true,
            "response": { "generateVideoResponse": { "generatedSamples": [
                { "video": { "uri": "https://example.test/files/abc:download?alt=media" } }
            ] } }
        }"#;
        let op: VideoOperation = serde_json::from_str::<OperationResponse>(raw).unwrap().into();

        assert!(op.done);
        assert_eq!(
            op.video_uri.as_deref(),
            Some("https://example.test/files/abc:download?alt=media")
        );
        assert!(op.error.is_none());
    }

    #[test]
    fn test_pending_operation_defaults_done_to_false() {
        let op: VideoOperation =
            serde_json::from_str::<OperationResponse>(r#"{ "name": "operations/1" }"#)
                .unwrap()
                .into();
        assert_eq!(op, VideoOperation::pending("operations/1"));
    }

    #[test]
    fn test_failed_operation_carries_message() {
        let raw = r#"{ "name": "op", "done": true, "error": { "code": 3, "message": "unsafe prompt" } }"#;
        let op: VideoOperation = serde_json::from_str::<OperationResponse>(raw).unwrap().into();
        assert_eq!(op.error.as_deref(), Some("unsafe prompt"));
    }

    #[test]
    fn test_missing_key_is_missing_credential() {
        let config = StudioConfig {
            api_key: Some("   ".to_string()),
            ..StudioConfig::default()
        };
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(GenAiError::MissingCredential)
        ));
    }

    #[test]
    fn test_generation_config_omits_unset_fields() {
        let config = GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(config).unwrap();
        assert_eq!(value, json!({ "responseMimeType": "application/json" }));
    }
}
