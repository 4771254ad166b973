use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Thresholds that decide when a computed truncation is worth proposing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TruncationConfig {
    /// Minimum number of truncatable entries that triggers a truncation on
    /// its own. A stale entry is one every follower has progressed past.
    ///
    /// Default: 100
    #[serde(default = "default_stale_entry_threshold")]
    pub stale_entry_threshold: u64,

    /// Minimum log size (bytes) at which any non-zero number of truncatable
    /// entries is truncated. Covers logs with few but very large entries.
    ///
    /// Default: 64 KiB
    #[serde(default = "default_stale_size_threshold")]
    pub stale_size_threshold_bytes: u64,

    /// Log size (bytes) beyond which followers that are not recently active
    /// stop protecting the log and may be cut off (requiring a state transfer).
    /// A group may lower this further, see `RaftGroup::max_log_size_override`.
    ///
    /// Default: 16 MiB
    #[serde(default = "default_log_truncation_threshold")]
    pub log_truncation_threshold_bytes: u64,
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            stale_entry_threshold: default_stale_entry_threshold(),
            stale_size_threshold_bytes: default_stale_size_threshold(),
            log_truncation_threshold_bytes: default_log_truncation_threshold(),
        }
    }
}

impl TruncationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stale_entry_threshold == 0 {
            return Err(Error::Config(ConfigError::Message(
                "stale_entry_threshold must be greater than 0".into(),
            )));
        }

        if self.log_truncation_threshold_bytes == 0 {
            return Err(Error::Config(ConfigError::Message(
                "log_truncation_threshold_bytes must be greater than 0".into(),
            )));
        }

        if self.stale_size_threshold_bytes > self.log_truncation_threshold_bytes {
            return Err(Error::Config(ConfigError::Message(format!(
                "stale_size_threshold_bytes {} should not exceed log_truncation_threshold_bytes {}",
                self.stale_size_threshold_bytes, self.log_truncation_threshold_bytes
            ))));
        }

        Ok(())
    }

    /// Effective size limit for one group.
    pub fn max_log_size(
        &self,
        group_override: Option<u64>,
    ) -> u64 {
        match group_override {
            Some(limit) => self.log_truncation_threshold_bytes.min(limit),
            None => self.log_truncation_threshold_bytes,
        }
    }
}

fn default_stale_entry_threshold() -> u64 {
    100
}
fn default_stale_size_threshold() -> u64 {
    64 << 10
}
fn default_log_truncation_threshold() -> u64 {
    16 << 20
}
