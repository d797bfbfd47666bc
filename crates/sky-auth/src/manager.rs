//! The session manager: login, readiness, and shutdown around the refresh machinery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::error::AuthError;
use crate::options::ManagerOptions;
use crate::policy::{RefreshAction, RefreshPolicy};
use crate::scheduler::{RefreshFlight, SchedulerHandle};
use crate::session::{Identity, SessionState, SessionStore};
use crate::transport::SessionTransport;

/// State shared between the manager, its refresh loop, and background refresh tasks.
pub(crate) struct Shared {
    pub(crate) transport: Arc<dyn SessionTransport>,
    pub(crate) store: SessionStore,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) policy: RefreshPolicy,
    pub(crate) flight: RefreshFlight,
    ready: AtomicBool,
    /// Cancelled on close and on session expiry; stops the refresh loop.
    shutdown: CancellationToken,
    last_error: Mutex<Option<String>>,
}

impl Shared {
    pub(crate) fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Mark the session permanently dead and stop the refresh loop.
    pub(crate) fn expire(&self) {
        self.ready.store(false, Ordering::Release);
        self.shutdown.cancel();
    }

    pub(crate) fn record_error(&self, error: Option<String>) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }
}

/// Keeps an authenticated session's token pair valid for as long as the
/// manager lives.
///
/// Created by [`SessionManager::connect`], which logs in and starts a
/// background loop that refreshes the pair as it nears expiry. A manager
/// never restarts: after [`SessionManager::close`] or once the refresh token
/// expires, build a new one.
pub struct SessionManager {
    shared: Arc<Shared>,
    scheduler: Mutex<Option<SchedulerHandle>>,
}

impl SessionManager {
    /// Check connectivity, log in, and start the refresh loop.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidOptions` if `options` are inconsistent.
    /// - `AuthError::Transport` if the `describeServer` sanity check fails.
    /// - `AuthError::Login` if the server rejects the credentials.
    /// - `AuthError::MasterCredentialsRejected` if the server accepted a
    ///   master password rather than an app password.
    /// - `AuthError::MalformedToken` / `AuthError::MissingExpiry` if either
    ///   returned token cannot be decoded.
    pub async fn connect(
        transport: Arc<dyn SessionTransport>,
        identifier: &str,
        secret: &str,
        options: ManagerOptions,
    ) -> Result<Self, AuthError> {
        let policy = options.policy()?;

        transport.describe_server().await?;

        let auth = transport
            .create_session(identifier, secret)
            .await
            .map_err(AuthError::Login)?;
        let state = SessionState::from_auth(auth)?;

        tracing::info!(
            handle = %state.identity.handle,
            access_expires_at = %state.access_expiry,
            refresh_expires_at = %state.refresh_expiry,
            "session created",
        );
        transport.authorize(&state.auth_info());

        let shutdown = CancellationToken::new();
        let shared = Arc::new(Shared {
            transport,
            store: SessionStore::new(state),
            clock: options.clock,
            policy,
            flight: RefreshFlight::new(),
            ready: AtomicBool::new(true),
            shutdown: shutdown.clone(),
            last_error: Mutex::new(None),
        });
        let scheduler =
            SchedulerHandle::spawn(Arc::clone(&shared), shutdown, options.poll_interval);

        Ok(Self {
            shared,
            scheduler: Mutex::new(Some(scheduler)),
        })
    }

    /// Whether the session can be used: true from a successful `connect`
    /// until `close` or refresh-token expiry.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shared.is_ready()
    }

    /// Stop the refresh loop and mark the manager not ready.
    ///
    /// Waits until the loop acknowledges the stop. Calling it again is a
    /// no-op. A background refresh that is still running finishes on its own;
    /// its tokens are discarded.
    pub async fn close(&self) {
        let scheduler = self
            .scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(scheduler) = scheduler else {
            tracing::debug!("session manager already closed");
            self.shared.ready.store(false, Ordering::Release);
            return;
        };

        tracing::info!("shutting down session manager");
        if !self.is_ready() {
            tracing::info!("session manager was not ready when shutting down");
        }
        scheduler.stop().await;
        self.shared.ready.store(false, Ordering::Release);
    }

    /// Refresh the token pair now, blocking until done.
    ///
    /// # Errors
    ///
    /// `AuthError::SessionExpired` if the refresh token has expired (this
    /// also ends the session). `AuthError::Closed` if the manager was closed
    /// before the server answered; the new pair is then discarded. Otherwise
    /// the transport or parse error. The current pair is kept on failure.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let result = self.shared.refresh().await;
        if let Err(err) = &result {
            if err.is_terminal() {
                self.shared.expire();
            }
        }
        result
    }

    /// Run one policy evaluation and its action, as a scheduler tick would.
    ///
    /// # Errors
    ///
    /// `AuthError::SessionExpired` if the refresh token is dead, or the
    /// error of a synchronous refresh. Background refresh failures are not
    /// reported here; see [`SessionManager::last_refresh_error`].
    pub async fn maybe_refresh(&self) -> Result<RefreshAction, AuthError> {
        self.shared.maybe_refresh().await
    }

    /// The current access token.
    pub async fn access_token(&self) -> String {
        self.shared.store.access_token().await
    }

    /// A consistent copy of the current token pair and expirations.
    pub async fn snapshot(&self) -> SessionState {
        self.shared.store.snapshot().await
    }

    pub async fn identity(&self) -> Identity {
        self.shared.store.identity().await
    }

    /// Whether a background refresh is running.
    #[must_use]
    pub fn refresh_in_flight(&self) -> bool {
        self.shared.flight.in_flight()
    }

    /// Error of the most recent background refresh, cleared on success.
    #[must_use]
    pub fn last_refresh_error(&self) -> Option<String> {
        self.shared
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // No handshake possible here; just make sure the loop winds down.
        self.shared.shutdown.cancel();
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ready", &self.is_ready())
            .field("refresh_in_flight", &self.refresh_in_flight())
            .finish_non_exhaustive()
    }
}
