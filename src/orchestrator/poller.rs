use super::retry::PollPolicy;
use crate::genai::{GenAiError, MediaGenerator, VideoOperation};

/// Poll `operation` until it reports done, within the policy's attempt budget.
/// Returns the finished video's URI.
pub async fn poll_until_done(
    media: &dyn MediaGenerator,
    mut operation: VideoOperation,
    policy: &PollPolicy,
) -> Result<String, GenAiError> {
    let mut attempt = 0u32;

    while !operation.done {
        if !policy.should_poll(attempt) {
            tracing::warn!(
                "Poller: {} still running after {} polls",
                operation.name,
                attempt
            );
            return Err(GenAiError::PollExhausted { attempts: attempt });
        }

        policy.wait_before_poll(attempt).await;

        match media.poll_video(&operation).await {
            Ok(next) => operation = next,
            Err(e) if policy.should_retry(attempt + 1, &e) => {
                tracing::warn!("Poller: transient error on {}: {}", operation.name, e);
            }
            Err(e) => return Err(e),
        }
        attempt += 1;
    }

    if let Some(message) = operation.error {
        return Err(GenAiError::OperationFailed(message));
    }

    tracing::info!("Poller: {} finished after {} polls", operation.name, attempt);
    operation
        .video_uri
        .ok_or_else(|| GenAiError::MalformedResponse("operation finished without a video".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::{InlineMedia, SpeechPayload};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedPolls {
        responses: Mutex<VecDeque<Result<VideoOperation, GenAiError>>>,
        polls: Mutex<u32>,
    }

    impl ScriptedPolls {
        fn new(responses: Vec<Result<VideoOperation, GenAiError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                polls: Mutex::new(0),
            }
        }

        fn polls(&self) -> u32 {
            *self.polls.lock().unwrap()
        }
    }

    #[async_trait]
    impl MediaGenerator for ScriptedPolls {
        async fn generate_image(&self, _prompt: &str) -> Result<InlineMedia, GenAiError> {
            unimplemented!()
        }

        async fn generate_speech(&self, _prompt: &str, _voice: &str) -> Result<SpeechPayload, GenAiError> {
            unimplemented!()
        }

        async fn start_video(&self, _prompt: &str) -> Result<VideoOperation, GenAiError> {
            unimplemented!()
        }

        async fn poll_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenAiError> {
            *self.polls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(operation.clone()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn finished(uri: &str) -> VideoOperation {
        VideoOperation {
            name: "op".to_string(),
            done: true,
            video_uri: Some(uri.to_string()),
            error: None,
        }
    }

    fn policy(attempts: u32) -> PollPolicy {
        PollPolicy::new(attempts, Duration::from_secs(10), Duration::from_secs(60))
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_done() {
        let media = ScriptedPolls::new(vec![
            Ok(VideoOperation::pending("op")),
            Ok(finished("https://example.test/v")),
        ]);

        let uri = poll_until_done(&media, VideoOperation::pending("op"), &policy(5))
            .await
            .unwrap();
        assert_eq!(uri, "https://example.test/v");
        assert_eq!(media.polls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_done_does_not_poll() {
        let media = ScriptedPolls::new(Vec::new());
        let uri = poll_until_done(&media, finished("u"), &policy(5)).await.unwrap();
        assert_eq!(uri, "u");
        assert_eq!(media.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_budget() {
        let media = ScriptedPolls::new(Vec::new());
        let result = poll_until_done(&media, VideoOperation::pending("op"), &policy(3)).await;
        assert_eq!(result, Err(GenAiError::PollExhausted { attempts: 3 }));
        assert_eq!(media.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_use_an_attempt() {
        let media = ScriptedPolls::new(vec![
            Err(GenAiError::Transport("reset".to_string())),
            Ok(finished("u")),
        ]);
        let uri = poll_until_done(&media, VideoOperation::pending("op"), &policy(5))
            .await
            .unwrap();
        assert_eq!(uri, "u");
        assert_eq!(media.polls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_stops_polling() {
        let media = ScriptedPolls::new(vec![Err(GenAiError::EntityNotFound("key".to_string()))]);
        let result = poll_until_done(&media, VideoOperation::pending("op"), &policy(5)).await;
        assert!(matches!(result, Err(GenAiError::EntityNotFound(_))));
        assert_eq!(media.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_operation_is_reported() {
        let mut failed = VideoOperation::pending("op");
        failed.done = true;
        failed.error = Some("blocked by safety filter".to_string());
        let media = ScriptedPolls::new(vec![Ok(failed)]);

        let result = poll_until_done(&media, VideoOperation::pending("op"), &policy(5)).await;
        assert_eq!(
            result,
            Err(GenAiError::OperationFailed("blocked by safety filter".to_string()))
        );
    }
}
