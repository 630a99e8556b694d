//! Admin-surface suites — `/ops/verify` and `/internal/storage/health`.
//!
//! Both require the admin token; a missing token turns the suites into
//! Skips rather than guaranteed 401 noise.

use serde_json::Value;
use tracing::info;

use pickwatch_core::config::SuitesConfig;
use pickwatch_core::types::{CheckOutcome, SuiteReport};
use pickwatch_probe::Auth;

use crate::context::AuditContext;

pub const OPS_VERIFY_PATH: &str = "/ops/verify";
pub const STORAGE_HEALTH_PATH: &str = "/internal/storage/health";

pub async fn run_verify(ctx: &AuditContext) -> SuiteReport {
    let mut report = SuiteReport::new("ops_verify");
    run_admin_probe(ctx, &mut report, OPS_VERIFY_PATH, |body, _| {
        assess_ops_verify(body)
    })
    .await;
    report.finish();
    info!(passed = report.passed(), failed = report.failed(), "ops verify suite done");
    report
}

pub async fn run_storage(ctx: &AuditContext) -> SuiteReport {
    let mut report = SuiteReport::new("storage_health");
    run_admin_probe(ctx, &mut report, STORAGE_HEALTH_PATH, assess_storage_health).await;
    report.finish();
    info!(passed = report.passed(), failed = report.failed(), "storage suite done");
    report
}

async fn run_admin_probe(
    ctx: &AuditContext,
    report: &mut SuiteReport,
    path: &str,
    assess: impl Fn(&Value, &SuitesConfig) -> Vec<CheckOutcome>,
) {
    let Some(prober) = ctx.prober() else {
        report.push(AuditContext::network_skip(path));
        return;
    };

    if ctx.config.target.admin_token.is_none() {
        report.push(CheckOutcome::skip("fetch", "no admin token configured").with_endpoint(path));
        return;
    }

    match prober.get_json(path, Auth::Admin).await {
        Ok(body) => report.extend(assess(&body, &ctx.config.suites)),
        Err(e) => report.push(CheckOutcome::fail("fetch", e.to_string()).with_endpoint(path)),
    }
}

/// Every entry in the `checks` array must report "pass".
pub fn assess_ops_verify(body: &Value) -> Vec<CheckOutcome> {
    let checks = match body.get("checks").and_then(Value::as_array) {
        Some(list) => list,
        None => {
            return vec![CheckOutcome::fail(
                "checks_present",
                "missing or non-array field: checks",
            )];
        }
    };

    let failing: Vec<String> = checks
        .iter()
        .filter(|c| c.get("result").and_then(Value::as_str) != Some("pass"))
        .map(|c| {
            let name = c.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
            let result = c.get("result").and_then(Value::as_str).unwrap_or("<missing>");
            format!("{name}={result}")
        })
        .collect();

    vec![if failing.is_empty() {
        CheckOutcome::pass("all_pass", format!("{} backend checks pass", checks.len()))
    } else {
        CheckOutcome::fail("all_pass", format!("failing checks: {}", failing.join(", ")))
    }]
}

/// Storage must be writable with a bounded backlog.
pub fn assess_storage_health(body: &Value, config: &SuitesConfig) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    outcomes.push(match body.get("writable").and_then(Value::as_bool) {
        Some(true) => CheckOutcome::pass("writable", "storage writable"),
        Some(false) => CheckOutcome::fail("writable", "storage not writable"),
        None => CheckOutcome::fail("writable", "missing field: writable"),
    });

    outcomes.push(match body.get("backlog").and_then(Value::as_u64) {
        Some(n) if n <= config.max_storage_backlog => CheckOutcome::pass(
            "backlog",
            format!("backlog {n} <= {}", config.max_storage_backlog),
        ),
        Some(n) => CheckOutcome::fail(
            "backlog",
            format!("backlog {n} exceeds {}", config.max_storage_backlog),
        ),
        None => CheckOutcome::fail("backlog", "missing field: backlog"),
    });

    outcomes
}
