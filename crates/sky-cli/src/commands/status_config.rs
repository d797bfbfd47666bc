use serde::Serialize;
use sky_config::SkyConfig;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ConfigStatus {
    server_url: String,
    session_configured: bool,
    handle: Option<String>,
    app_password_set: bool,
    async_threshold_secs: u64,
    sync_threshold_secs: u64,
    poll_interval_ms: u64,
}

impl From<&SkyConfig> for ConfigStatus {
    fn from(config: &SkyConfig) -> Self {
        Self {
            server_url: config.server.url.clone(),
            session_configured: config.session.is_configured(),
            handle: (!config.session.handle.is_empty()).then(|| config.session.handle.clone()),
            app_password_set: !config.session.app_password.is_empty(),
            async_threshold_secs: config.refresh.async_threshold_secs,
            sync_threshold_secs: config.refresh.sync_threshold_secs,
            poll_interval_ms: config.refresh.poll_interval_ms,
        }
    }
}

/// Handle `sky status-config`.
pub fn handle(config: &SkyConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&ConfigStatus::from(config), flags.format)
}
