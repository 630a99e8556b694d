//! Golden gate — the ordered CI gate over every network suite.
//!
//! Stage order mirrors blast radius: a dead `/health` makes the rest
//! noise, so with `fail_fast` the gate stops at the first red stage.

use tracing::{info, warn};

use pickwatch_core::types::SuiteReport;

use crate::context::AuditContext;
use crate::{best_bets, health, integrations, ops};

pub async fn run(ctx: &AuditContext, fail_fast: bool) -> SuiteReport {
    let mut gate = SuiteReport::new("golden_gate");

    for stage in ["health", "integrations", "best_bets", "ops_verify", "storage_health"] {
        let report = match stage {
            "health" => health::run(ctx).await,
            "integrations" => integrations::run(ctx).await,
            "best_bets" => best_bets::run(ctx).await,
            "ops_verify" => ops::run_verify(ctx).await,
            "storage_health" => ops::run_storage(ctx).await,
            _ => unreachable!(),
        };

        let red = !report.is_green();
        gate.absorb(report);

        if red {
            warn!(%stage, "golden gate stage failed");
            if fail_fast {
                info!(%stage, "fail-fast: skipping remaining stages");
                break;
            }
        }
    }

    gate.finish();
    info!(
        passed = gate.passed(),
        failed = gate.failed(),
        skipped = gate.skipped(),
        green = gate.is_green(),
        "golden gate done"
    );
    gate
}
