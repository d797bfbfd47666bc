//! The remote session endpoints the manager depends on.
//!
//! [`SessionTransport`] is the seam between the lifecycle manager and the
//! network. The production implementation is [`crate::xrpc::XrpcTransport`];
//! tests substitute an in-memory one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("XRPC error ({status}) {error}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable XRPC error name (e.g. `ExpiredToken`).
        error: String,
        /// Human-readable message or raw response body.
        message: String,
    },

    /// The server returned 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The response body could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Session credentials, as returned by `createSession` / `refreshSession` and
/// presented as the bearer credential on authenticated calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub handle: String,
    pub did: String,
}

impl AuthInfo {
    /// The credential to present on `refreshSession`: a copy of `self` whose
    /// access token is replaced by the refresh token.
    #[must_use]
    pub fn as_refresh_credential(&self) -> Self {
        Self {
            access_jwt: self.refresh_jwt.clone(),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInfo")
            .field("access_jwt", &"<redacted>")
            .field("refresh_jwt", &"<redacted>")
            .field("handle", &self.handle)
            .field("did", &self.did)
            .finish()
    }
}

/// `describeServer` output. Only used as a connectivity check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    #[serde(default)]
    pub available_user_domains: Vec<String>,
    #[serde(default)]
    pub did: Option<String>,
    #[serde(default)]
    pub invite_code_required: Option<bool>,
}

#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Connectivity sanity check. Any successful response is accepted.
    async fn describe_server(&self) -> Result<ServerInfo, TransportError>;

    /// Log in with an account identifier (handle or DID) and an app password.
    async fn create_session(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<AuthInfo, TransportError>;

    /// Exchange the presented credential for a new token pair. The manager
    /// passes [`AuthInfo::as_refresh_credential`], so `credential.access_jwt`
    /// holds the refresh token.
    async fn refresh_session(&self, credential: &AuthInfo) -> Result<AuthInfo, TransportError>;

    /// Install `auth` as the credential for subsequent business calls.
    /// Called after every successful login and refresh.
    fn authorize(&self, auth: &AuthInfo);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn auth() -> AuthInfo {
        AuthInfo {
            access_jwt: "access".into(),
            refresh_jwt: "refresh".into(),
            handle: "test.bsky.social".into(),
            did: "did:plc:test".into(),
        }
    }

    #[test]
    fn refresh_credential_presents_refresh_token() {
        let credential = auth().as_refresh_credential();
        assert_eq!(credential.access_jwt, "refresh");
        assert_eq!(credential.refresh_jwt, "refresh");
        assert_eq!(credential.handle, "test.bsky.social");
        assert_eq!(credential.did, "did:plc:test");
    }

    #[test]
    fn parses_create_session_body() {
        let body = r#"{
            "accessJwt": "a.b.c",
            "refreshJwt": "d.e.f",
            "handle": "test.bsky.social",
            "did": "did:plc:test",
            "active": true
        }"#;
        let parsed: AuthInfo = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.access_jwt, "a.b.c");
        assert_eq!(parsed.refresh_jwt, "d.e.f");
    }

    #[test]
    fn debug_redacts_tokens() {
        let rendered = format!("{:?}", auth());
        assert!(!rendered.contains("\"access\""));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("did:plc:test"));
    }

    #[test]
    fn server_info_tolerates_missing_fields() {
        let info: ServerInfo =
            serde_json::from_str(r#"{"availableUserDomains":[".bsky.social"]}"#).unwrap();
        assert_eq!(info.available_user_domains, vec![".bsky.social".to_string()]);
        assert!(info.did.is_none());
    }
}
