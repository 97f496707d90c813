use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// When the checkpoint file is rewritten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointPolicy {
    /// After every recorded batch. A crash can replay at most the batch that
    /// was appended but not yet checkpointed.
    #[default]
    EveryBatch,
    /// Only when the rate limiter takes a long pause, and once at the end of
    /// the run. Batches appended since the last pause are replayed (and
    /// appended again) after a crash.
    AtPause,
}

/// Every knob of a run, passed explicitly to the orchestrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub max_requests_before_pause: usize,
    #[serde(with = "seconds")]
    pub delay_between_batches: Duration,
    #[serde(with = "seconds")]
    pub long_pause_duration: Duration,
    pub retries: u32,
    #[serde(with = "seconds")]
    pub retry_delay: Duration,
    pub intermediate_language: String,
    pub source_language: String,
    pub target_language: String,
    pub sample_size: Option<usize>,
    pub cache_capacity: usize,
    pub checkpoint_policy: CheckpointPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_requests_before_pause: 180,
            delay_between_batches: Duration::from_secs(5),
            long_pause_duration: Duration::from_secs(60),
            retries: 1,
            retry_delay: Duration::from_secs(10),
            intermediate_language: "fr".to_string(),
            source_language: "auto".to_string(),
            target_language: "en".to_string(),
            sample_size: None,
            cache_capacity: 10_000,
            checkpoint_policy: CheckpointPolicy::EveryBatch,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)
            .map_err(|err| Error::invalid_config(format!("cannot read {}: {err}", path.display())))?;
        serde_json::from_slice(&raw)
            .map_err(|err| Error::invalid_config(format!("cannot parse {}: {err}", path.display())))
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn max_requests_before_pause(mut self, n: usize) -> Self {
        self.max_requests_before_pause = n;
        self
    }

    pub fn delay_between_batches(mut self, delay: Duration) -> Self {
        self.delay_between_batches = delay;
        self
    }

    pub fn long_pause_duration(mut self, pause: Duration) -> Self {
        self.long_pause_duration = pause;
        self
    }

    pub fn retries(mut self, attempts: u32) -> Self {
        self.retries = attempts;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn intermediate_language(mut self, lang: impl Into<String>) -> Self {
        self.intermediate_language = lang.into();
        self
    }

    pub fn sample_size(mut self, cap: Option<usize>) -> Self {
        self.sample_size = cap;
        self
    }

    pub fn cache_capacity(mut self, entries: usize) -> Self {
        self.cache_capacity = entries;
        self
    }

    pub fn checkpoint_policy(mut self, policy: CheckpointPolicy) -> Self {
        self.checkpoint_policy = policy;
        self
    }

    /// Zero delays everywhere; handy for tests and dry runs.
    pub fn without_delays(self) -> Self {
        self.delay_between_batches(Duration::ZERO)
            .long_pause_duration(Duration::ZERO)
            .retry_delay(Duration::ZERO)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::invalid_config("batch_size must be greater than zero"));
        }
        if self.retries == 0 {
            return Err(Error::invalid_config("retries must be at least one attempt"));
        }
        if self.max_requests_before_pause == 0 {
            return Err(Error::invalid_config(
                "max_requests_before_pause must be greater than zero",
            ));
        }
        if self.cache_capacity == 0 {
            return Err(Error::invalid_config("cache_capacity must be greater than zero"));
        }
        for (name, code) in [
            ("intermediate_language", &self.intermediate_language),
            ("source_language", &self.source_language),
            ("target_language", &self.target_language),
        ] {
            if code.trim().is_empty() {
                return Err(Error::invalid_config(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(de)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
