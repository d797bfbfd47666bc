//! Decoding of session JWT payloads.
//!
//! Tokens are decoded, not verified: the signature segment is never checked
//! (the server signs with ES256K, and the client only needs the expirations
//! and the scope).

use base64::Engine as _;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Scope carried by access tokens minted from an app password.
pub const APP_PASSWORD_SCOPE: &str = "com.atproto.appPass";

/// Scope carried by refresh tokens.
pub const REFRESH_SCOPE: &str = "com.atproto.refresh";

/// Decoded payload of a session token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Credential class the token was minted from.
    #[serde(default)]
    pub scope: String,
    /// Account DID (`sub` claim).
    #[serde(default, rename = "sub")]
    pub subject: String,
    /// Issue time, Unix seconds (`iat` claim).
    #[serde(default, rename = "iat")]
    pub issued_at: i64,
    /// Expiry time, Unix seconds (`exp` claim). Never zero once parsed.
    #[serde(default, rename = "exp")]
    pub expires_at: i64,
    /// Intended audience (`aud` claim).
    #[serde(default, rename = "aud")]
    pub audience: String,
}

impl TokenClaims {
    /// Expiry as a UTC timestamp.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedToken` if `exp` is outside chrono's range.
    pub fn expiry(&self) -> Result<DateTime<Utc>, AuthError> {
        DateTime::from_timestamp(self.expires_at, 0).ok_or_else(|| {
            AuthError::MalformedToken(format!("invalid exp timestamp {}", self.expires_at))
        })
    }

    /// Time left until expiry, negative once expired.
    ///
    /// `None` when the difference does not fit a `TimeDelta`.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.expires_at
            .checked_sub(now.timestamp())
            .and_then(TimeDelta::try_seconds)
    }
}

/// Decode the payload segment of `jwt` into claims.
///
/// # Errors
///
/// Returns `AuthError::MalformedToken` if the token is not three dot-separated
/// segments, the payload is not unpadded URL-safe base64, or the payload is
/// not a JSON claims object. Returns `AuthError::MissingExpiry` if `exp` is
/// absent or zero.
pub fn parse_claims(jwt: &str) -> Result<TokenClaims, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::MalformedToken(format!(
            "expected 3 segments, found {}",
            parts.len()
        )));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AuthError::MalformedToken(format!("base64 decode failed: {e}")))?;
    let claims: TokenClaims = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::MalformedToken(format!("claims parse failed: {e}")))?;

    if claims.expires_at == 0 {
        return Err(AuthError::MissingExpiry);
    }

    Ok(claims)
}

/// Decode an access token and reject anything not minted from an app password.
///
/// # Errors
///
/// Everything [`parse_claims`] returns, plus
/// `AuthError::MasterCredentialsRejected` when the scope is not
/// [`APP_PASSWORD_SCOPE`].
pub fn parse_access_claims(jwt: &str) -> Result<TokenClaims, AuthError> {
    let claims = parse_claims(jwt)?;
    if claims.scope != APP_PASSWORD_SCOPE {
        return Err(AuthError::MasterCredentialsRejected {
            scope: claims.scope,
        });
    }
    Ok(claims)
}

/// Decode a refresh token. No scope check: refresh tokens carry their own scope.
///
/// # Errors
///
/// Everything [`parse_claims`] returns.
pub fn parse_refresh_claims(jwt: &str) -> Result<TokenClaims, AuthError> {
    parse_claims(jwt)
}
