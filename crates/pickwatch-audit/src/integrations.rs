//! Integration registry suite — `/live/debug/integrations`.
//!
//! The backend exposes its live-data integrations (odds feeds, injury
//! wires, the research/esoteric engines) with an enabled flag and a
//! status string. The audit catches silently-disabled or erroring
//! integrations before they rot a slate.

use serde_json::Value;
use tracing::info;

use pickwatch_core::config::SuitesConfig;
use pickwatch_core::types::{CheckOutcome, SuiteReport};
use pickwatch_probe::Auth;

use crate::context::AuditContext;

pub const INTEGRATIONS_PATH: &str = "/live/debug/integrations";

pub async fn run(ctx: &AuditContext) -> SuiteReport {
    let mut report = SuiteReport::new("integrations");

    let Some(prober) = ctx.prober() else {
        report.push(AuditContext::network_skip(INTEGRATIONS_PATH));
        return report;
    };

    match prober.get_json(INTEGRATIONS_PATH, Auth::ApiKey).await {
        Ok(body) => report.extend(assess_integrations(&body, &ctx.config.suites)),
        Err(e) => {
            report.push(
                CheckOutcome::fail("fetch", e.to_string()).with_endpoint(INTEGRATIONS_PATH),
            );
        }
    }

    report.finish();
    info!(passed = report.passed(), failed = report.failed(), "integrations suite done");
    report
}

pub fn assess_integrations(body: &Value, config: &SuitesConfig) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    let integrations = match body.get("integrations").and_then(Value::as_array) {
        Some(list) => list,
        None => {
            outcomes.push(CheckOutcome::fail(
                "registry_present",
                "missing or non-array field: integrations",
            ));
            return outcomes;
        }
    };

    outcomes.push(if integrations.len() >= config.min_integrations {
        CheckOutcome::pass(
            "registry_size",
            format!(
                "{} integrations registered (minimum {})",
                integrations.len(),
                config.min_integrations
            ),
        )
    } else {
        CheckOutcome::fail(
            "registry_size",
            format!(
                "{} integrations registered, minimum {}",
                integrations.len(),
                config.min_integrations
            ),
        )
    });

    // Expected integrations must be present and enabled.
    for expected in &config.expected_integrations {
        let found = integrations
            .iter()
            .find(|i| i.get("name").and_then(Value::as_str) == Some(expected.as_str()));
        let check = format!("enabled.{expected}");
        outcomes.push(match found {
            None => CheckOutcome::fail(check, format!("{expected} not registered")),
            Some(entry) => {
                if entry.get("enabled").and_then(Value::as_bool) == Some(true) {
                    CheckOutcome::pass(check, format!("{expected} enabled"))
                } else {
                    CheckOutcome::fail(check, format!("{expected} registered but disabled"))
                }
            }
        });
    }

    // Nothing may sit in an error state, expected or not.
    let erroring: Vec<String> = integrations
        .iter()
        .filter(|i| i.get("status").and_then(Value::as_str) == Some("error"))
        .map(|i| {
            i.get("name")
                .and_then(Value::as_str)
                .unwrap_or("<unnamed>")
                .to_string()
        })
        .collect();
    outcomes.push(if erroring.is_empty() {
        CheckOutcome::pass("no_errors", "no integration in error state")
    } else {
        CheckOutcome::fail("no_errors", format!("in error state: {}", erroring.join(", ")))
    });

    outcomes
}
