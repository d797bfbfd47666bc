//! Current credentials and their expirations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::claims::{parse_access_claims, parse_refresh_claims};
use crate::error::AuthError;
use crate::transport::AuthInfo;

/// Account the session belongs to, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub handle: String,
    pub did: String,
}

/// One complete token pair. Replaced wholesale on every refresh, never
/// patched field by field.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionState {
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub access_expiry: DateTime<Utc>,
    pub refresh_expiry: DateTime<Utc>,
    pub identity: Identity,
}

impl SessionState {
    /// Build a state from a server-issued token pair.
    ///
    /// The access token goes through the scope-checked parser, so a pair
    /// minted from master credentials never becomes a session.
    ///
    /// # Errors
    ///
    /// Returns the claims parser's error for either token.
    pub fn from_auth(auth: AuthInfo) -> Result<Self, AuthError> {
        let access_expiry = parse_access_claims(&auth.access_jwt)?.expiry()?;
        let refresh_expiry = parse_refresh_claims(&auth.refresh_jwt)?.expiry()?;

        Ok(Self {
            access_jwt: auth.access_jwt,
            refresh_jwt: auth.refresh_jwt,
            access_expiry,
            refresh_expiry,
            identity: Identity {
                handle: auth.handle,
                did: auth.did,
            },
        })
    }

    /// The credential form of this state, for handing to a transport.
    #[must_use]
    pub fn auth_info(&self) -> AuthInfo {
        AuthInfo {
            access_jwt: self.access_jwt.clone(),
            refresh_jwt: self.refresh_jwt.clone(),
            handle: self.identity.handle.clone(),
            did: self.identity.did.clone(),
        }
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("access_expiry", &self.access_expiry)
            .field("refresh_expiry", &self.refresh_expiry)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Lock-guarded holder of the current [`SessionState`].
///
/// Readers take the shared lock briefly and always see a complete pair. The
/// refresh executor holds the exclusive lock across its remote call.
#[derive(Debug)]
pub struct SessionStore {
    state: RwLock<SessionState>,
}

impl SessionStore {
    #[must_use]
    pub fn new(state: SessionState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn access_token(&self) -> String {
        self.state.read().await.access_jwt.clone()
    }

    /// `(access_expiry, refresh_expiry)` read together under one lock.
    pub async fn expirations(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let state = self.state.read().await;
        (state.access_expiry, state.refresh_expiry)
    }

    pub async fn identity(&self) -> Identity {
        self.state.read().await.identity.clone()
    }

    /// Swap in a new pair in one step.
    pub async fn replace(&self, next: SessionState) {
        *self.state.write().await = next;
    }

    /// Exclusive access for the refresh executor.
    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().await
    }
}
