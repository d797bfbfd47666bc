//! Refresh timing policy.

use chrono::{DateTime, TimeDelta, Utc};

/// What the scheduler should do about the current token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    /// The access token has ample validity left.
    None,
    /// Refresh in the background; the current access token keeps serving calls.
    Async,
    /// Too close to expiry to risk it: refresh before doing anything else.
    Sync,
    /// The refresh token is dead. Only a fresh login can recover.
    Expired,
}

/// Maps "now" and the two expirations to a [`RefreshAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Remaining access validity below which a background refresh starts.
    pub async_window: TimeDelta,
    /// Remaining access validity below which refresh blocks the caller.
    /// Always shorter than `async_window`.
    pub sync_window: TimeDelta,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            async_window: TimeDelta::minutes(5),
            sync_window: TimeDelta::minutes(2),
        }
    }
}

impl RefreshPolicy {
    /// Classify the session at `now`.
    ///
    /// Expiry of the refresh token is checked first: a pair that is both
    /// inside the refresh windows and past the refresh expiry is `Expired`,
    /// never a refresh attempt that cannot succeed. `access_expiry` later than
    /// `refresh_expiry` is tolerated.
    #[must_use]
    pub fn decide(
        &self,
        now: DateTime<Utc>,
        access_expiry: DateTime<Utc>,
        refresh_expiry: DateTime<Utc>,
    ) -> RefreshAction {
        if refresh_expiry <= now {
            return RefreshAction::Expired;
        }

        let remaining = access_expiry - now;
        if remaining < self.sync_window {
            RefreshAction::Sync
        } else if remaining < self.async_window {
            RefreshAction::Async
        } else {
            RefreshAction::None
        }
    }
}
