//! `/health` suite — liveness plus basic shape.

use serde_json::Value;
use tracing::info;

use pickwatch_core::jsonpath;
use pickwatch_core::types::{CheckOutcome, SuiteReport};
use pickwatch_probe::Auth;

use crate::context::AuditContext;

pub const HEALTH_PATH: &str = "/health";

pub async fn run(ctx: &AuditContext) -> SuiteReport {
    let mut report = SuiteReport::new("health");

    let Some(prober) = ctx.prober() else {
        report.push(AuditContext::network_skip(HEALTH_PATH));
        return report;
    };

    match prober.get_json(HEALTH_PATH, Auth::None).await {
        Ok(body) => report.extend(assess_health(&body)),
        Err(e) => {
            report.push(CheckOutcome::fail("fetch", e.to_string()).with_endpoint(HEALTH_PATH));
        }
    }

    report.finish();
    info!(passed = report.passed(), failed = report.failed(), "health suite done");
    report
}

/// Assertions over the `/health` body.
pub fn assess_health(body: &Value) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    outcomes.push(match jsonpath::require_string_eq(body, "status", "ok") {
        Ok(()) => CheckOutcome::pass("status_ok", "status == \"ok\""),
        Err(e) => CheckOutcome::fail("status_ok", e),
    });

    outcomes.push(match jsonpath::require_field(body, "version") {
        Ok(()) => CheckOutcome::pass("version_present", "version field present"),
        Err(e) => CheckOutcome::fail("version_present", e),
    });

    outcomes
}
