//! XRPC transport over `reqwest`.
//!
//! Implements the three session endpoints the manager needs
//! (`com.atproto.server.describeServer`, `createSession`, `refreshSession`)
//! and holds the credential used for authenticated business calls such as
//! [`XrpcTransport::search_posts`].

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::transport::{AuthInfo, ServerInfo, SessionTransport, TransportError};

/// The main Bluesky PDS entryway.
pub const BSKY_SOCIAL: &str = "https://bsky.social";

/// Result limit used by [`XrpcTransport::search_posts`] when none is given.
pub const DEFAULT_SEARCH_LIMIT: u32 = 25;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// XRPC error envelope: `{"error": "...", "message": "..."}`.
#[derive(Debug, Default, Deserialize)]
struct XrpcErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct CreateSessionInput<'a> {
    identifier: &'a str,
    password: &'a str,
}

/// Parameters for `app.bsky.feed.searchPosts`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPostsRequest {
    pub q: String,
    pub sort: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub mentions: Option<String>,
    pub author: Option<String>,
    pub lang: Option<String>,
    pub domain: Option<String>,
    pub url: Option<String>,
    pub tag: Vec<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

impl SearchPostsRequest {
    #[must_use]
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Self::default()
        }
    }

    /// Query parameters for the non-empty fields, with the default limit
    /// filled in when none was given.
    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.q.is_empty() {
            params.push(("q", self.q.clone()));
        }
        let optional = [
            ("sort", &self.sort),
            ("since", &self.since),
            ("until", &self.until),
            ("mentions", &self.mentions),
            ("author", &self.author),
            ("lang", &self.lang),
            ("domain", &self.domain),
            ("url", &self.url),
            ("cursor", &self.cursor),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                params.push((name, value.clone()));
            }
        }
        for tag in self.tag.iter().filter(|t| !t.is_empty()) {
            params.push(("tag", tag.clone()));
        }

        let limit = match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => {
                tracing::warn!(
                    "no limit given for searchPosts; falling back to {DEFAULT_SEARCH_LIMIT}"
                );
                DEFAULT_SEARCH_LIMIT
            }
        };
        params.push(("limit", limit.to_string()));
        params
    }
}

/// `app.bsky.feed.searchPosts` output. Post views are passed through as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPostsOutput {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub hits_total: Option<u64>,
    #[serde(default)]
    pub posts: Vec<serde_json::Value>,
}

/// XRPC client bound to one PDS host.
#[derive(Debug)]
pub struct XrpcTransport {
    http: reqwest::Client,
    host: String,
    auth: RwLock<Option<AuthInfo>>,
}

impl XrpcTransport {
    /// Create a transport for `host` (e.g. [`BSKY_SOCIAL`]).
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Http` if the HTTP client cannot be built.
    pub fn new(host: impl Into<String>) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("skyline/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(http, host))
    }

    /// Create a transport around a caller-supplied HTTP client.
    #[must_use]
    pub fn with_client(http: reqwest::Client, host: impl Into<String>) -> Self {
        Self {
            http,
            host: host.into(),
            auth: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The credential currently used for authenticated calls.
    #[must_use]
    pub fn current_auth(&self) -> Option<AuthInfo> {
        self.auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{nsid}", self.host.trim_end_matches('/'))
    }

    fn bearer(&self) -> Option<String> {
        self.auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|auth| auth.access_jwt.clone())
    }

    /// Search posts with the current access token.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the request fails, the server returns a
    /// non-success status, or the response cannot be parsed.
    pub async fn search_posts(
        &self,
        request: &SearchPostsRequest,
    ) -> Result<SearchPostsOutput, TransportError> {
        let query = request
            .query_params()
            .into_iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{query}", self.url("app.bsky.feed.searchPosts"));

        let mut builder = self.http.get(&url);
        if let Some(token) = self.bearer() {
            builder = builder.bearer_auth(token);
        }
        let resp = check_response(builder.send().await?).await?;
        resp.json()
            .await
            .map_err(|e| TransportError::Parse(format!("searchPosts: {e}")))
    }
}

#[async_trait]
impl SessionTransport for XrpcTransport {
    async fn describe_server(&self) -> Result<ServerInfo, TransportError> {
        let resp = self
            .http
            .get(self.url("com.atproto.server.describeServer"))
            .send()
            .await?;
        let resp = check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| TransportError::Parse(format!("describeServer: {e}")))
    }

    async fn create_session(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<AuthInfo, TransportError> {
        let resp = self
            .http
            .post(self.url("com.atproto.server.createSession"))
            .json(&CreateSessionInput {
                identifier,
                password: secret,
            })
            .send()
            .await?;
        let resp = check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| TransportError::Parse(format!("createSession: {e}")))
    }

    async fn refresh_session(&self, credential: &AuthInfo) -> Result<AuthInfo, TransportError> {
        let resp = self
            .http
            .post(self.url("com.atproto.server.refreshSession"))
            .bearer_auth(&credential.access_jwt)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| TransportError::Parse(format!("refreshSession: {e}")))
    }

    fn authorize(&self, auth: &AuthInfo) {
        *self.auth.write().unwrap_or_else(PoisonError::into_inner) = Some(auth.clone());
    }
}

/// Map 429 and other non-success responses to [`TransportError`].
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = resp.status();
    if status == 429 {
        return Err(TransportError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let envelope: XrpcErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = if envelope.message.is_empty() {
            body
        } else {
            envelope.message
        };
        return Err(TransportError::Api {
            status: status.as_u16(),
            error: envelope.error,
            message,
        });
    }
    Ok(resp)
}

/// `Retry-After` as seconds, 60 if absent or not numeric.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}
