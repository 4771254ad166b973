use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Deadlines for the two blocking points of a truncation turn.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Deadline for `LogStorage::recompute_size` (milliseconds)
    #[serde(default = "default_size_recompute_timeout_ms")]
    pub size_recompute_timeout_ms: u64,

    /// Deadline for submitting the truncation command (milliseconds)
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,

    /// Minimum interval between `info` logs of decisions that imply new
    /// state transfers (milliseconds)
    #[serde(default = "default_decision_log_interval_ms")]
    pub decision_log_interval_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            size_recompute_timeout_ms: default_size_recompute_timeout_ms(),
            submit_timeout_ms: default_submit_timeout_ms(),
            decision_log_interval_ms: default_decision_log_interval_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size_recompute_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "size_recompute_timeout_ms must be at least 1ms".into(),
            )));
        }

        if self.submit_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "submit_timeout_ms must be at least 1ms".into(),
            )));
        }

        Ok(())
    }

    pub fn size_recompute_timeout(&self) -> Duration {
        Duration::from_millis(self.size_recompute_timeout_ms)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn decision_log_interval(&self) -> Duration {
        Duration::from_millis(self.decision_log_interval_ms)
    }
}

fn default_size_recompute_timeout_ms() -> u64 {
    30_000
}
fn default_submit_timeout_ms() -> u64 {
    10_000
}
fn default_decision_log_interval_ms() -> u64 {
    10_000
}
