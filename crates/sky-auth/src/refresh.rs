//! Session refresh: the policy evaluation step and the executor behind it.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::AuthError;
use crate::manager::Shared;
use crate::policy::RefreshAction;
use crate::session::SessionState;

impl Shared {
    /// Evaluate the refresh policy once and act on the outcome.
    ///
    /// `Sync` refreshes inline and returns its result. `Async` hands the
    /// refresh to a detached task if no other background refresh is running,
    /// and returns immediately. An expired refresh token ends the session.
    pub(crate) async fn maybe_refresh(self: &Arc<Self>) -> Result<RefreshAction, AuthError> {
        let expirations = self.store.expirations().await;
        self.apply_policy(expirations).await
    }

    /// The decision half of [`Shared::maybe_refresh`], for expirations the
    /// caller already read.
    pub(crate) async fn apply_policy(
        self: &Arc<Self>,
        (access_expiry, refresh_expiry): (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<RefreshAction, AuthError> {
        let now = self.clock.now();
        let action = self.policy.decide(now, access_expiry, refresh_expiry);

        match action {
            RefreshAction::None => {
                tracing::debug!(
                    access_expires_at = %access_expiry,
                    %now,
                    "access token still valid; skipping refresh",
                );
            }
            RefreshAction::Expired => {
                let err = AuthError::SessionExpired {
                    expired_at: refresh_expiry,
                };
                tracing::error!(error = %err, "refresh token expired");
                self.expire();
                return Err(err);
            }
            RefreshAction::Sync => {
                tracing::info!(
                    access_expires_at = %access_expiry,
                    "access token expires very soon; refreshing synchronously",
                );
                if let Err(err) = self.refresh().await {
                    if err.is_terminal() {
                        self.expire();
                    }
                    return Err(err);
                }
            }
            RefreshAction::Async => self.spawn_background_refresh(access_expiry),
        }

        Ok(action)
    }

    fn spawn_background_refresh(self: &Arc<Self>, access_expiry: DateTime<Utc>) {
        let Some(permit) = self.flight.try_acquire() else {
            tracing::debug!("background refresh already in flight");
            return;
        };

        tracing::info!(
            access_expires_at = %access_expiry,
            "access token expires soon; refreshing in the background",
        );
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            // Released on every exit path when the permit drops.
            let _permit = permit;
            match shared.refresh().await {
                Ok(()) => shared.record_error(None),
                Err(AuthError::Closed) => {
                    tracing::debug!("session manager closed; discarding refreshed tokens");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "background session refresh failed");
                    if err.is_terminal() {
                        shared.expire();
                    }
                    shared.record_error(Some(err.to_string()));
                }
            }
        });
    }

    /// Exchange the refresh token for a new pair and swap it in.
    ///
    /// Holds the exclusive session lock across the remote call, so concurrent
    /// refreshes serialize and each sees the pair the previous one installed.
    /// On any failure the current pair is left untouched. If the manager was
    /// closed while the call was out, the new pair is discarded and
    /// `AuthError::Closed` is returned.
    pub(crate) async fn refresh(&self) -> Result<(), AuthError> {
        let mut state = self.store.write().await;
        let now = self.clock.now();

        tracing::info!(
            access_expires_in_secs = (state.access_expiry - now).num_seconds(),
            "refreshing session",
        );

        if state.refresh_expiry <= now {
            return Err(AuthError::SessionExpired {
                expired_at: state.refresh_expiry,
            });
        }

        let credential = state.auth_info().as_refresh_credential();
        let auth = self.transport.refresh_session(&credential).await?;
        let next = SessionState::from_auth(auth)?;

        if !self.is_ready() {
            return Err(AuthError::Closed);
        }

        tracing::info!(
            access_expires_at = %next.access_expiry,
            access_expires_in_secs = (next.access_expiry - now).num_seconds(),
            "session refreshed",
        );
        if next.refresh_expiry > state.refresh_expiry {
            tracing::info!(
                refresh_expires_at = %next.refresh_expiry,
                refresh_expires_in_secs = (next.refresh_expiry - now).num_seconds(),
                "received a new refresh token",
            );
        }

        self.transport.authorize(&next.auth_info());
        *state = next;
        Ok(())
    }
}
