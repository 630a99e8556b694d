pub mod suites;
pub mod watch;

use pickwatch_core::HarnessConfig;

use crate::{Cli, Commands};

/// Dispatch a subcommand. Returns whether the run was green.
pub async fn run(cli: &Cli, config: HarnessConfig) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Watch { interval } => {
            watch::run(config, interval).await?;
            Ok(true)
        }
        command => suites::run(command, config, cli.json).await,
    }
}
