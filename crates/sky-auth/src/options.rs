use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;

use crate::clock::{Clock, SystemClock};
use crate::error::AuthError;
use crate::policy::RefreshPolicy;

/// Default remaining access validity that triggers a background refresh.
pub const DEFAULT_ASYNC_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// Default remaining access validity that triggers a blocking refresh.
pub const DEFAULT_SYNC_THRESHOLD: Duration = Duration::from_secs(2 * 60);

/// Default pause between scheduler ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Tuning for a [`crate::SessionManager`]. Defaults are applied once, at
/// construction; the manager never consults global state.
#[derive(Clone)]
pub struct ManagerOptions {
    pub async_threshold: Duration,
    pub sync_threshold: Duration,
    pub poll_interval: Duration,
    pub clock: Arc<dyn Clock>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            async_threshold: DEFAULT_ASYNC_THRESHOLD,
            sync_threshold: DEFAULT_SYNC_THRESHOLD,
            poll_interval: DEFAULT_POLL_INTERVAL,
            clock: Arc::new(SystemClock),
        }
    }
}

impl ManagerOptions {
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub const fn with_thresholds(
        mut self,
        async_threshold: Duration,
        sync_threshold: Duration,
    ) -> Self {
        self.async_threshold = async_threshold;
        self.sync_threshold = sync_threshold;
        self
    }

    /// Check the options and derive the refresh policy from them.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOptions` if the sync threshold is not
    /// strictly below the async threshold, a threshold does not fit a
    /// `TimeDelta`, or the poll interval is zero.
    pub fn policy(&self) -> Result<RefreshPolicy, AuthError> {
        if self.sync_threshold >= self.async_threshold {
            return Err(AuthError::InvalidOptions(format!(
                "sync threshold ({:?}) must be below async threshold ({:?})",
                self.sync_threshold, self.async_threshold
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(AuthError::InvalidOptions(
                "poll interval must be greater than zero".into(),
            ));
        }

        let to_delta = |d: Duration, name: &str| {
            TimeDelta::from_std(d)
                .map_err(|e| AuthError::InvalidOptions(format!("{name} out of range: {e}")))
        };
        Ok(RefreshPolicy {
            async_window: to_delta(self.async_threshold, "async threshold")?,
            sync_window: to_delta(self.sync_threshold, "sync threshold")?,
        })
    }
}

impl std::fmt::Debug for ManagerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerOptions")
            .field("async_threshold", &self.async_threshold)
            .field("sync_threshold", &self.sync_threshold)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
