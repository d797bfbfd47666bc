//! In-memory session transport and token builders shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use sky_auth::claims::{APP_PASSWORD_SCOPE, REFRESH_SCOPE};
use sky_auth::{AuthInfo, ServerInfo, SessionTransport, TransportError};
use tokio::sync::Semaphore;

pub const HANDLE: &str = "alice.test";
pub const DID: &str = "did:plc:alice";

/// Whole-second "now", so JWT `exp` round-trips exactly.
pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(Utc::now().timestamp(), 0).expect("valid timestamp")
}

/// An unsigned JWT carrying `scope` and `exp`.
pub fn jwt(scope: &str, exp: DateTime<Utc>) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"ES256K","typ":"at+jwt"}"#);
    let claims = serde_json::json!({
        "scope": scope,
        "sub": DID,
        "iat": exp.timestamp() - 3600,
        "exp": exp.timestamp(),
        "aud": "did:web:pds.test",
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// A session whose access and refresh tokens expire at the given instants.
pub fn session(access_exp: DateTime<Utc>, refresh_exp: DateTime<Utc>) -> AuthInfo {
    session_with_scope(APP_PASSWORD_SCOPE, access_exp, refresh_exp)
}

pub fn session_with_scope(
    access_scope: &str,
    access_exp: DateTime<Utc>,
    refresh_exp: DateTime<Utc>,
) -> AuthInfo {
    AuthInfo {
        access_jwt: jwt(access_scope, access_exp),
        refresh_jwt: jwt(REFRESH_SCOPE, refresh_exp),
        handle: HANDLE.to_string(),
        did: DID.to_string(),
    }
}

fn api_error(status: u16) -> TransportError {
    TransportError::Api {
        status,
        error: "InternalServerError".to_string(),
        message: "scripted failure".to_string(),
    }
}

/// Scripted [`SessionTransport`] that records every call it receives.
#[derive(Default)]
pub struct MockTransport {
    describe_fails: bool,
    login: Mutex<Option<Result<AuthInfo, u16>>>,
    refresh_reply: Mutex<Option<Result<AuthInfo, u16>>>,
    /// When set, `refresh_session` waits for a permit before answering.
    gate: Option<Arc<Semaphore>>,
    describe_calls: AtomicUsize,
    create_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    presented: Mutex<Vec<AuthInfo>>,
    authorized: Mutex<Vec<AuthInfo>>,
}

impl MockTransport {
    pub fn new(login: AuthInfo) -> Self {
        Self {
            login: Mutex::new(Some(Ok(login))),
            ..Self::default()
        }
    }

    pub fn failing_describe() -> Self {
        Self {
            describe_fails: true,
            ..Self::default()
        }
    }

    pub fn rejecting_login(status: u16) -> Self {
        Self {
            login: Mutex::new(Some(Err(status))),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_refresh(self, reply: AuthInfo) -> Self {
        *self.refresh_reply.lock().expect("lock") = Some(Ok(reply));
        self
    }

    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_refresh(&self, reply: AuthInfo) {
        *self.refresh_reply.lock().expect("lock") = Some(Ok(reply));
    }

    pub fn fail_refresh(&self, status: u16) {
        *self.refresh_reply.lock().expect("lock") = Some(Err(status));
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Credentials presented to `refresh_session`, in call order.
    pub fn presented(&self) -> Vec<AuthInfo> {
        self.presented.lock().expect("lock").clone()
    }

    /// Sessions installed through `authorize`, in call order.
    pub fn authorized(&self) -> Vec<AuthInfo> {
        self.authorized.lock().expect("lock").clone()
    }
}

#[async_trait]
impl SessionTransport for MockTransport {
    async fn describe_server(&self) -> Result<ServerInfo, TransportError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        if self.describe_fails {
            return Err(api_error(502));
        }
        Ok(ServerInfo {
            available_user_domains: vec![".test".to_string()],
            did: Some("did:web:pds.test".to_string()),
            invite_code_required: Some(false),
        })
    }

    async fn create_session(
        &self,
        _identifier: &str,
        _secret: &str,
    ) -> Result<AuthInfo, TransportError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        match self.login.lock().expect("lock").clone() {
            Some(Ok(auth)) => Ok(auth),
            Some(Err(status)) => Err(TransportError::Api {
                status,
                error: "AuthenticationRequired".to_string(),
                message: "Invalid identifier or password".to_string(),
            }),
            None => Err(TransportError::Parse("no login scripted".to_string())),
        }
    }

    async fn refresh_session(&self, credential: &AuthInfo) -> Result<AuthInfo, TransportError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.presented.lock().expect("lock").push(credential.clone());

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        match self.refresh_reply.lock().expect("lock").clone() {
            Some(Ok(auth)) => Ok(auth),
            Some(Err(status)) => Err(api_error(status)),
            None => Err(TransportError::Parse("no refresh scripted".to_string())),
        }
    }

    fn authorize(&self, auth: &AuthInfo) {
        self.authorized.lock().expect("lock").push(auth.clone());
    }
}

pub fn minutes(n: i64) -> TimeDelta {
    TimeDelta::minutes(n)
}

pub fn hours(n: i64) -> TimeDelta {
    TimeDelta::hours(n)
}
