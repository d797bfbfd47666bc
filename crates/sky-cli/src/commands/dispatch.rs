use sky_config::SkyConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: &SkyConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Login => commands::login::handle(config, flags).await,
        Commands::Watch(args) => commands::watch::handle(&args, config, flags).await,
        Commands::Search(args) => commands::search::handle(&args, config, flags).await,
        Commands::StatusConfig => commands::status_config::handle(config, flags),
    }
}
