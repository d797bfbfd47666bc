use std::sync::Arc;

use anyhow::Context;
use sky_auth::{ManagerOptions, SessionManager, XrpcTransport};
use sky_config::{RefreshConfig, SkyConfig};

/// Load `.env` from the working directory (if any), then the layered config.
pub fn load_config() -> anyhow::Result<SkyConfig> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }

    SkyConfig::load().context("failed to load skyline configuration")
}

/// Map the `[refresh]` section onto session manager options.
pub fn manager_options(refresh: &RefreshConfig) -> ManagerOptions {
    ManagerOptions::default()
        .with_thresholds(refresh.async_threshold(), refresh.sync_threshold())
        .with_poll_interval(refresh.poll_interval())
}

/// Log in with the configured credentials and start keeping the session fresh.
///
/// The transport is returned alongside the manager so callers can make
/// authenticated calls with whatever token the manager installed last.
pub async fn open_session(
    config: &SkyConfig,
) -> anyhow::Result<(Arc<XrpcTransport>, SessionManager)> {
    let session = config.require_session().map_err(|error| {
        anyhow::anyhow!("{error}; set SKYLINE_SESSION__HANDLE and SKYLINE_SESSION__APP_PASSWORD")
    })?;

    let transport = Arc::new(
        XrpcTransport::new(config.server.url.as_str())
            .with_context(|| format!("failed to build HTTP client for {}", config.server.url))?,
    );

    tracing::debug!(server = %config.server.url, handle = %session.handle, "logging in");
    let manager = SessionManager::connect(
        transport.clone(),
        &session.handle,
        &session.app_password,
        manager_options(&config.refresh),
    )
    .await
    .with_context(|| format!("failed to log in to {}", config.server.url))?;

    Ok((transport, manager))
}
