use crate::config::StudioConfig;
use crate::genai::GenAiError;
use std::time::Duration;
use tokio::time::sleep;

/// Bounded exponential backoff between polls of a long-running operation.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl PollPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    pub fn from_config(config: &StudioConfig) -> Self {
        Self::new(
            config.poll_max_attempts,
            config.poll_initial_delay(),
            config.poll_max_delay(),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn should_poll(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Transient errors are retried while attempts remain
    pub fn should_retry(&self, attempt: u32, error: &GenAiError) -> bool {
        self.should_poll(attempt) && error.is_retryable()
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    pub async fn wait_before_poll(&self, attempt: u32) {
        let delay = self.delay_for(attempt);
        tracing::debug!(
            "Polling again in {}s (attempt {}/{})",
            delay.as_secs(),
            attempt + 1,
            self.max_attempts
        );
        sleep(delay).await;
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(10), Duration::from_secs(60))
    }
}
