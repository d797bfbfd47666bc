//! Background loop that keeps the session fresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, oneshot};
use tokio_util::sync::CancellationToken;

use crate::manager::Shared;

/// Single-flight guard for background refreshes: a one-permit semaphore.
///
/// The permit is moved into the refresh task and released when the task
/// ends, whatever its outcome.
#[derive(Debug)]
pub(crate) struct RefreshFlight {
    permits: Arc<Semaphore>,
}

impl RefreshFlight {
    pub(crate) fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Take the guard if nobody holds it. Never waits.
    pub(crate) fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).try_acquire_owned().ok()
    }

    pub(crate) fn in_flight(&self) -> bool {
        self.permits.available_permits() == 0
    }
}

/// Owner-side handle on a running refresh loop.
///
/// Stopping is a two-phase handshake: cancel the token, then wait until the
/// loop reports that it has exited.
#[derive(Debug)]
pub(crate) struct SchedulerHandle {
    stop: CancellationToken,
    stopped: oneshot::Receiver<()>,
}

impl SchedulerHandle {
    /// Start the loop on the current tokio runtime.
    ///
    /// `stop` is shared with the session so that a terminal refresh failure
    /// anywhere can end the loop as well.
    pub(crate) fn spawn(shared: Arc<Shared>, stop: CancellationToken, pause: Duration) -> Self {
        let (stopped_tx, stopped) = oneshot::channel();
        tokio::spawn(run(shared, stop.clone(), pause, stopped_tx));
        Self { stop, stopped }
    }

    /// Request a stop and wait for the loop to acknowledge it.
    ///
    /// Returns at once if the loop already exited on its own. A synchronous
    /// refresh the loop is running is not interrupted; the loop exits after
    /// it. A detached background refresh is never waited for.
    pub(crate) async fn stop(self) {
        self.stop.cancel();
        // Err means the loop is gone without acknowledging, which only
        // happens if it panicked or the runtime is shutting down.
        if self.stopped.await.is_err() {
            tracing::warn!("session refresher exited without acknowledging stop");
        }
    }
}

async fn run(
    shared: Arc<Shared>,
    stop: CancellationToken,
    pause: Duration,
    stopped: oneshot::Sender<()>,
) {
    tracing::debug!(pause_ms = pause.as_millis(), "session refresher started");

    loop {
        // A background refresh holds the write lock for its whole remote
        // call; only the wait for the lock yields to a stop request.
        let expirations = tokio::select! {
            biased;
            () = stop.cancelled() => {
                tracing::info!("stopping session refresher");
                break;
            }
            expirations = shared.store.expirations() => expirations,
        };

        match shared.apply_policy(expirations).await {
            Ok(_) => {}
            Err(err) if err.is_terminal() => {
                tracing::error!(
                    error = %err,
                    "shutting down session refresher; create a new session manager to continue",
                );
                break;
            }
            Err(err) => {
                tracing::warn!(error = %err, "session refresh failed; retrying on next tick");
            }
        }

        tokio::select! {
            biased;
            () = stop.cancelled() => {
                tracing::info!("stopping session refresher");
                break;
            }
            () = tokio::time::sleep(pause) => {}
        }
    }

    let _ = stopped.send(());
    tracing::info!("session refresher stopped");
}
