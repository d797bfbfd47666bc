use std::time::Duration;

use anyhow::Context;
use sky_config::SkyConfig;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::WatchArgs;
use crate::commands::shared::SessionStatus;
use crate::output::output;

/// Handle `sky watch`.
///
/// Reports the session every `--report-every` seconds until Ctrl-C or until
/// the session can no longer be refreshed.
pub async fn handle(
    args: &WatchArgs,
    config: &SkyConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let (_transport, manager) = bootstrap::open_session(config).await?;
    let report_every = Duration::from_secs(args.report_every.max(1));

    output(&SessionStatus::of(&manager).await, flags.format)?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal.context("failed to listen for Ctrl-C")?;
                tracing::info!("interrupted; closing session");
                break;
            }
            () = tokio::time::sleep(report_every) => {
                let status = SessionStatus::of(&manager).await;
                let ready = status.ready;
                output(&status, flags.format)?;
                if !ready {
                    manager.close().await;
                    anyhow::bail!("session expired; run `sky login` again");
                }
            }
        }
    }

    manager.close().await;
    if !flags.quiet {
        output(&SessionStatus::of(&manager).await, flags.format)?;
    }
    Ok(())
}
