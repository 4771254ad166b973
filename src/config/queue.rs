use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Scheduler parameters for the truncation queue.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// When false, no group is ever admitted.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum number of groups waiting to be processed. Admissions beyond
    /// this are dropped; the periodic scan re-adds them later.
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Number of groups processed concurrently. Each group's truncation sits
    /// on its own I/O path, so a small pool keeps truncation latency low
    /// without serializing all groups.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_size: default_max_size(),
            concurrency: default_concurrency(),
        }
    }
}

impl QueueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(Error::Config(ConfigError::Message("queue max_size must be > 0".into())));
        }

        if self.concurrency == 0 {
            return Err(Error::Config(ConfigError::Message(
                "queue concurrency must be > 0".into(),
            )));
        }

        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}
fn default_max_size() -> usize {
    10_000
}
fn default_concurrency() -> usize {
    16
}
