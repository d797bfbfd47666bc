//! Refresh timing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_async_threshold_secs() -> u64 {
    300
}

const fn default_sync_threshold_secs() -> u64 {
    120
}

const fn default_poll_interval_ms() -> u64 {
    300_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Refresh in the background once the access token has less than this
    /// many seconds left.
    #[serde(default = "default_async_threshold_secs")]
    pub async_threshold_secs: u64,

    /// Refresh before serving anything once less than this many seconds are left.
    /// Must be below `async_threshold_secs`.
    #[serde(default = "default_sync_threshold_secs")]
    pub sync_threshold_secs: u64,

    /// Pause between refresh checks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            async_threshold_secs: default_async_threshold_secs(),
            sync_threshold_secs: default_sync_threshold_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl RefreshConfig {
    /// Check that the thresholds are ordered and the loop actually pauses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync_threshold_secs >= self.async_threshold_secs {
            return Err(ConfigError::InvalidValue {
                field: "refresh.sync_threshold_secs".into(),
                reason: format!(
                    "must be below refresh.async_threshold_secs ({} >= {})",
                    self.sync_threshold_secs, self.async_threshold_secs
                ),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh.poll_interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub const fn async_threshold(&self) -> Duration {
        Duration::from_secs(self.async_threshold_secs)
    }

    pub const fn sync_threshold(&self) -> Duration {
        Duration::from_secs(self.sync_threshold_secs)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
