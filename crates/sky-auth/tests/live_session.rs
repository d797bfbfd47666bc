//! # Live session tests
//!
//! These tests log in to a real AT Protocol server. They are skipped (not
//! failed) when credentials are missing.
//!
//! ## Required environment variables
//!
//! ```bash
//! SKYLINE_SESSION__HANDLE=alice.bsky.social
//! # an app password, never the account password
//! SKYLINE_SESSION__APP_PASSWORD=xxxx-xxxx-xxxx-xxxx
//! ```
//!
//! Optional: `SKYLINE_SERVER__URL` (defaults to `https://bsky.social`).
//!
//! ## Run
//!
//! ```bash
//! cargo test -p sky-auth --test live_session -- --nocapture
//! ```

use std::sync::Arc;

use sky_auth::{BSKY_SOCIAL, ManagerOptions, SearchPostsRequest, SessionManager, XrpcTransport};

fn load_env() {
    let workspace_env = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .map(|p| p.join(".env"));

    if let Some(env_path) = workspace_env {
        let _ = dotenvy::from_path(&env_path);
    }
}

struct Credentials {
    host: String,
    handle: String,
    app_password: String,
}

fn credentials() -> Option<Credentials> {
    load_env();
    let handle = std::env::var("SKYLINE_SESSION__HANDLE").ok()?;
    let app_password = std::env::var("SKYLINE_SESSION__APP_PASSWORD").ok()?;
    if handle.is_empty() || app_password.is_empty() {
        return None;
    }
    let host = std::env::var("SKYLINE_SERVER__URL").unwrap_or_else(|_| BSKY_SOCIAL.to_string());
    Some(Credentials {
        host,
        handle,
        app_password,
    })
}

async fn connect(creds: &Credentials) -> (Arc<XrpcTransport>, SessionManager) {
    let transport = Arc::new(XrpcTransport::new(&creds.host).expect("build transport"));
    let manager = SessionManager::connect(
        transport.clone(),
        &creds.handle,
        &creds.app_password,
        ManagerOptions::default(),
    )
    .await
    .expect("login should succeed");
    (transport, manager)
}

#[tokio::test]
async fn live_login_refresh_and_close() {
    let Some(creds) = credentials() else {
        eprintln!("SKIP: SKYLINE_SESSION__HANDLE / SKYLINE_SESSION__APP_PASSWORD not set");
        return;
    };

    let (transport, manager) = connect(&creds).await;
    assert!(manager.is_ready());

    let before = manager.snapshot().await;
    assert!(before.access_expiry > chrono::Utc::now());
    assert!(before.refresh_expiry > before.access_expiry);

    manager.refresh().await.expect("refresh should succeed");
    let after = manager.snapshot().await;
    assert_ne!(after.access_jwt, before.access_jwt);
    assert_eq!(
        transport.current_auth().map(|auth| auth.access_jwt),
        Some(after.access_jwt.clone())
    );

    manager.close().await;
    assert!(!manager.is_ready());

    eprintln!(
        "  PASS: live session: handle={}, access expires {}",
        after.identity.handle, after.access_expiry
    );
}

#[tokio::test]
async fn live_search_posts_uses_session_token() {
    let Some(creds) = credentials() else {
        eprintln!("SKIP: SKYLINE_SESSION__HANDLE / SKYLINE_SESSION__APP_PASSWORD not set");
        return;
    };

    let (transport, manager) = connect(&creds).await;

    let mut request = SearchPostsRequest::new("bluesky");
    request.limit = Some(5);
    let output = transport
        .search_posts(&request)
        .await
        .expect("searchPosts should succeed");
    assert!(output.posts.len() <= 5);

    eprintln!("  PASS: searchPosts returned {} posts", output.posts.len());
    manager.close().await;
}
