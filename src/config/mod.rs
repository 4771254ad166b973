//! Configuration for the raft log truncation queue.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Component-wise validation
//!
//! Every tunable that drives a truncation decision lives here and is passed
//! explicitly into the truncator and the queue.
mod activity;
mod queue;
mod timeouts;
mod truncation;
pub use activity::*;
pub use queue::*;
pub use timeouts::*;
pub use truncation::*;


use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Environment variable prefix, e.g. `RAFT_LOG_QUEUE__QUEUE__CONCURRENCY=32`.
pub const ENV_PREFIX: &str = "RAFT_LOG_QUEUE";

/// Environment variable naming an optional configuration file.
pub const CONFIG_PATH_ENV: &str = "RAFT_LOG_QUEUE_CONFIG_PATH";

/// Main configuration container for the truncation queue components
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `RAFT_LOG_QUEUE_CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TruncatorConfig {
    /// Decision thresholds
    #[serde(default)]
    pub truncation: TruncationConfig,
    /// Scheduler parameters
    #[serde(default)]
    pub queue: QueueConfig,
    /// Follower liveness window
    #[serde(default)]
    pub activity: ActivityConfig,
    /// Deadlines for collaborator calls
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl Debug for TruncatorConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("TruncatorConfig")
            .field("truncation", &self.truncation)
            .field("queue", &self.queue)
            .finish()
    }
}

impl TruncatorConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `RAFT_LOG_QUEUE_CONFIG_PATH` (if set)
    /// 3. Environment variables with `RAFT_LOG_QUEUE__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred so further overrides can be applied with
    /// `with_override_config()`. Callers MUST call `validate()` before use.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("RAFT_LOG_QUEUE__QUEUE__CONCURRENCY", "4");
    /// let cfg = TruncatorConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    pub fn validate(self) -> Result<Self> {
        self.truncation.validate()?;
        self.queue.validate()?;
        self.activity.validate()?;
        self.timeouts.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
