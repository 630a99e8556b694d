//! One-shot suite subcommands: run, render, write artifacts, verdict.

use anyhow::Context;

use pickwatch_audit::{AuditContext, best_bets, full, gate, health, integrations, ops};
use pickwatch_core::HarnessConfig;
use pickwatch_core::types::SuiteReport;
use pickwatch_report::{ColorMode, render_report, write_artifacts};

use crate::Commands;

pub async fn run(command: &Commands, mut config: HarnessConfig, json: bool) -> anyhow::Result<bool> {
    // Per-command config tweaks before the context is built.
    match command {
        Commands::BestBets { sport } if !sport.is_empty() => {
            config.suites.sports = sport.clone();
        }
        Commands::Drift { path: Some(path) } => {
            config.drift.scan_root = Some(path.clone());
        }
        _ => {}
    }

    let report = execute(command, &config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report, ColorMode::Auto));
    }

    let dir = std::path::Path::new(config.artifacts_dir()).to_path_buf();
    let paths = write_artifacts(&dir, &report)
        .with_context(|| format!("writing artifacts under {}", dir.display()))?;
    tracing::debug!(json = %paths.json.display(), "artifacts written");

    Ok(report.is_green())
}

async fn execute(command: &Commands, config: &HarnessConfig) -> anyhow::Result<SuiteReport> {
    // Drift needs no prober; everything else builds a full context.
    if let Commands::Drift { .. } = command {
        return Ok(pickwatch_drift::run(&config.drift));
    }

    let ctx = AuditContext::new(config.clone())?;
    Ok(match command {
        Commands::Health => health::run(&ctx).await,
        Commands::BestBets { .. } => best_bets::run(&ctx).await,
        Commands::Integrations => integrations::run(&ctx).await,
        Commands::Verify => ops::run_verify(&ctx).await,
        Commands::Storage => ops::run_storage(&ctx).await,
        Commands::Gate { fail_fast } => gate::run(&ctx, *fail_fast).await,
        Commands::Full => full::run(&ctx).await,
        Commands::Drift { .. } | Commands::Watch { .. } => unreachable!("handled above"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickwatch_core::config::{DriftConfig, ForbiddenRule, RetryConfig, SuitesConfig, TargetConfig};

    fn offline_config(artifacts_dir: &std::path::Path) -> HarnessConfig {
        HarnessConfig {
            target: TargetConfig {
                base_url: String::new(),
                api_key: None,
                admin_token: None,
                timeout: "1s".to_string(),
                skip_network: true,
            },
            retry: RetryConfig::default(),
            suites: SuitesConfig::default(),
            drift: DriftConfig::default(),
            artifacts_dir: Some(artifacts_dir.display().to_string()),
        }
    }

    #[tokio::test]
    async fn drift_command_scans_override_path() {
        let scan = tempfile::tempdir().unwrap();
        std::fs::write(scan.path().join("app.py"), "url = \"http://localhost\"\n").unwrap();
        let artifacts = tempfile::tempdir().unwrap();

        let mut config = offline_config(artifacts.path());
        config.drift.forbidden = vec![ForbiddenRule {
            name: "localhost".to_string(),
            pattern: "http://localhost".to_string(),
            extensions: vec![],
        }];

        let command = Commands::Drift {
            path: Some(scan.path().display().to_string()),
        };
        let green = run(&command, config, true).await.unwrap();
        assert!(!green);

        // Artifacts land even on red runs.
        let entries: Vec<_> = std::fs::read_dir(artifacts.path()).unwrap().collect();
        assert_eq!(entries.len(), 3);
    }

    #[tokio::test]
    async fn offline_gate_command_is_green() {
        let artifacts = tempfile::tempdir().unwrap();
        let config = offline_config(artifacts.path());

        let command = Commands::Gate { fail_fast: false };
        let green = run(&command, config, true).await.unwrap();
        assert!(green);
    }

    #[tokio::test]
    async fn best_bets_sport_flag_overrides_config() {
        let artifacts = tempfile::tempdir().unwrap();
        let config = offline_config(artifacts.path());

        let command = Commands::BestBets {
            sport: vec!["wnba".to_string()],
        };
        // Offline run: one skip per requested sport.
        let green = run(&command, config, true).await.unwrap();
        assert!(green);
    }
}
