use sky_config::SkyConfig;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::commands::shared::SessionStatus;
use crate::output::output;

/// Handle `sky login`.
pub async fn handle(config: &SkyConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let (_transport, manager) = bootstrap::open_session(config).await?;

    let status = SessionStatus::of(&manager).await;
    manager.close().await;

    output(&status, flags.format)
}
