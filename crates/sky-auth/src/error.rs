use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The token is not `<header>.<payload>.<signature>`, or its payload does
    /// not decode into claims.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("token carries no expiration (`exp` claim missing or zero)")]
    MissingExpiry,

    /// The server accepted the credential, but the access token was minted
    /// from the account's master password rather than an app password.
    #[error("master credentials rejected (token scope `{scope}`); log in with an app password")]
    MasterCredentialsRejected { scope: String },

    /// The refresh token itself is past its expiry. Terminal: a new login is required.
    #[error("session expired: refresh token was valid until {expired_at}")]
    SessionExpired { expired_at: DateTime<Utc> },

    /// `createSession` was rejected by the server.
    #[error("login rejected: {0}")]
    Login(#[source] TransportError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The manager was closed while a refresh was out; its tokens were discarded.
    #[error("session manager closed; refreshed tokens discarded")]
    Closed,

    #[error("invalid session manager options: {0}")]
    InvalidOptions(String),
}

impl AuthError {
    /// Whether this error ends the session for good.
    ///
    /// Only [`AuthError::SessionExpired`] is terminal; transport and parse
    /// failures during a refresh leave the previous session intact and are
    /// retried on the next scheduler tick.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}
