use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Outcome counts and wall-clock timings per pipeline stage, across runs.
#[derive(Debug, Default, Clone, Serialize)]
pub struct StageMetrics {
    success_counts: HashMap<String, u64>,
    failure_counts: HashMap<String, u64>,
    total_durations: HashMap<String, Duration>,
    last_durations: HashMap<String, Duration>,
}

impl StageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, stage: &str, elapsed: Duration) {
        *self.success_counts.entry(stage.to_string()).or_insert(0) += 1;
        self.record_duration(stage, elapsed);
    }

    pub fn record_failure(&mut self, stage: &str, elapsed: Duration) {
        *self.failure_counts.entry(stage.to_string()).or_insert(0) += 1;
        self.record_duration(stage, elapsed);
    }

    fn record_duration(&mut self, stage: &str, elapsed: Duration) {
        *self.total_durations.entry(stage.to_string()).or_default() += elapsed;
        self.last_durations.insert(stage.to_string(), elapsed);
    }

    pub fn get_success_count(&self, stage: &str) -> u64 {
        *self.success_counts.get(stage).unwrap_or(&0)
    }

    pub fn get_failure_count(&self, stage: &str) -> u64 {
        *self.failure_counts.get(stage).unwrap_or(&0)
    }

    pub fn get_success_rate(&self, stage: &str) -> f32 {
        let success = self.get_success_count(stage) as f32;
        let total = success + self.get_failure_count(stage) as f32;

        if total == 0.0 {
            0.0
        } else {
            success / total
        }
    }

    /// How long the stage took in its most recent run.
    pub fn last_duration(&self, stage: &str) -> Option<Duration> {
        self.last_durations.get(stage).copied()
    }

    pub fn average_duration(&self, stage: &str) -> Option<Duration> {
        let runs = self.get_success_count(stage) + self.get_failure_count(stage);
        if runs == 0 {
            return None;
        }
        self.total_durations
            .get(stage)
            .map(|total| total.div_f64(runs as f64))
    }
}
