use serde::Serialize;
use sky_auth::{SessionManager, SessionState};

/// Session summary shared by `login` and `watch`. Never carries tokens.
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub ready: bool,
    pub handle: String,
    pub did: String,
    pub access_expires_at: String,
    pub refresh_expires_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh_error: Option<String>,
}

impl SessionStatus {
    pub async fn of(manager: &SessionManager) -> Self {
        let snapshot = manager.snapshot().await;
        Self::from_parts(manager.is_ready(), &snapshot, manager.last_refresh_error())
    }

    fn from_parts(ready: bool, state: &SessionState, last_refresh_error: Option<String>) -> Self {
        Self {
            ready,
            handle: state.identity.handle.clone(),
            did: state.identity.did.clone(),
            access_expires_at: state.access_expiry.to_rfc3339(),
            refresh_expires_at: state.refresh_expiry.to_rfc3339(),
            last_refresh_error,
        }
    }
}
