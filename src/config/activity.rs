use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Follower liveness window.
///
/// A follower counts as recently active when the leader heard from it within
/// `lease_duration_ms * activity_window_multiplier`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ActivityConfig {
    /// Leader lease duration in milliseconds
    #[serde(default = "default_lease_duration_ms")]
    pub lease_duration_ms: u64,

    #[serde(default = "default_activity_window_multiplier")]
    pub activity_window_multiplier: u32,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            lease_duration_ms: default_lease_duration_ms(),
            activity_window_multiplier: default_activity_window_multiplier(),
        }
    }
}

impl ActivityConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lease_duration_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "lease_duration_ms must be greater than 0".into(),
            )));
        }

        if self.activity_window_multiplier == 0 {
            return Err(Error::Config(ConfigError::Message(
                "activity_window_multiplier must be greater than 0".into(),
            )));
        }

        Ok(())
    }

    pub fn activity_window(&self) -> Duration {
        Duration::from_millis(self.lease_duration_ms) * self.activity_window_multiplier
    }
}

fn default_lease_duration_ms() -> u64 {
    6_000
}
fn default_activity_window_multiplier() -> u32 {
    1
}
