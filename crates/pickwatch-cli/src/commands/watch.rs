//! Continuous watch mode over the core endpoints.

use anyhow::bail;
use tracing::info;

use pickwatch_audit::best_bets;
use pickwatch_core::HarnessConfig;
use pickwatch_core::config::parse_duration;
use pickwatch_probe::{Auth, EndpointHealth, EndpointMonitor, Prober};

const DOWN_THRESHOLD: u32 = 3;

pub async fn run(config: HarnessConfig, interval: &str) -> anyhow::Result<()> {
    let Some(interval) = parse_duration(interval) else {
        bail!("invalid interval {interval:?} (expected e.g. \"5s\" or \"500ms\")");
    };
    if config.target.skip_network {
        bail!("watch mode needs the network but SKIP_NETWORK is set");
    }

    let prober = Prober::from_config(&config)?;
    let monitor = EndpointMonitor::new(prober, interval, DOWN_THRESHOLD);

    monitor.start("/health", Auth::None).await;
    for sport in &config.suites.sports {
        monitor.start(&best_bets::endpoint_for(sport), Auth::ApiKey).await;
    }

    info!(
        endpoints = config.suites.sports.len() + 1,
        interval_ms = interval.as_millis() as u64,
        "watch mode started (ctrl-c to stop)"
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                print_snapshot(&monitor).await;
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    monitor.stop_all().await;
    info!("watch mode stopped");
    Ok(())
}

fn health_label(health: EndpointHealth) -> &'static str {
    match health {
        EndpointHealth::Up => "UP",
        EndpointHealth::Down => "DOWN",
        EndpointHealth::Unknown => "?",
    }
}

async fn print_snapshot(monitor: &EndpointMonitor) {
    let snapshot = monitor.snapshot().await;
    let mut paths: Vec<_> = snapshot.keys().collect();
    paths.sort();

    let line: Vec<String> = paths
        .iter()
        .map(|path| format!("{path}={}", health_label(snapshot[*path])))
        .collect();
    println!("{}", line.join("  "));
}
