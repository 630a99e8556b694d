use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use pickwatch_core::HarnessConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "pickwatch",
    about = "Pickwatch — black-box verification harness for the picks API",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to pickwatch.toml (default: ./pickwatch.toml if present).
    /// BASE_URL, API_KEY, ADMIN_TOKEN, SKIP_NETWORK, ALLOW_EMPTY, and
    /// ARTIFACTS_DIR override the file.
    #[arg(short, long, global = true)]
    config: Option<String>,
    /// Override the target base URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Override the artifacts directory
    #[arg(long, global = true)]
    artifacts_dir: Option<String>,
    /// Print the report as JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe /health
    Health,
    /// Audit /live/best-bets/{sport} invariants
    BestBets {
        /// Sports to audit (default: the configured list)
        #[arg(short, long)]
        sport: Vec<String>,
    },
    /// Audit the live integration registry
    Integrations,
    /// Run the backend's /ops/verify checks
    Verify,
    /// Probe internal storage health
    Storage,
    /// Run the ordered CI gate (health → integrations → best-bets → ops)
    Gate {
        /// Stop at the first red stage
        #[arg(long)]
        fail_fast: bool,
    },
    /// Full system audit: every network suite plus the drift scans
    Full,
    /// Source drift scans only (no network)
    Drift {
        /// Scan root (default: [drift].scan_root, then ".")
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Continuously watch core endpoints
    Watch {
        /// Probe interval, e.g. "5s" or "500ms"
        #[arg(short, long, default_value = "5s")]
        interval: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<HarnessConfig> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::from_file(Path::new(path))?,
        None => {
            let default = Path::new("pickwatch.toml");
            if default.exists() {
                HarnessConfig::from_file(default)?
            } else {
                HarnessConfig::from_env()?
            }
        }
    };

    if let Some(url) = &cli.base_url {
        config.target.base_url = url.clone();
    }
    if let Some(dir) = &cli.artifacts_dir {
        config.artifacts_dir = Some(dir.clone());
    }
    // Drift never touches the network, so an absent base_url is fine there.
    if !matches!(cli.command, Commands::Drift { .. }) {
        config.validate()?;
    }
    Ok(config)
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pickwatch=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("pickwatch: {e}");
        return ExitCode::from(2);
    }

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pickwatch: {e}");
            return ExitCode::from(2);
        }
    };

    match commands::run(&cli, config).await {
        Ok(green) => {
            if green {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("pickwatch: {e}");
            ExitCode::from(2)
        }
    }
}
