//! Local source drift scans.
//!
//! No network: walks a source tree for forbidden literals and verifies
//! documentation still references the load-bearing source files.

pub mod docs;
pub mod scanner;

use std::path::Path;

use tracing::info;

use pickwatch_core::config::DriftConfig;
use pickwatch_core::types::{CheckOutcome, SuiteReport};

/// Run the full drift suite over the configured scan root.
pub fn run(config: &DriftConfig) -> SuiteReport {
    let mut report = SuiteReport::new("drift");
    let root_raw = config.scan_root.as_deref().unwrap_or(".");
    let root = Path::new(root_raw);

    if !root.is_dir() {
        report.push(CheckOutcome::fail(
            "scan_root",
            format!("scan root {root_raw:?} is not a directory"),
        ));
        report.finish();
        return report;
    }

    let forbidden = if config.forbidden.is_empty() {
        scanner::default_rules()
    } else {
        config.forbidden.clone()
    };
    match scanner::compile_rules(&forbidden) {
        Ok(rules) => report.extend(scanner::scan_tree(root, &rules)),
        Err(e) => report.push(CheckOutcome::fail("rules", e)),
    }
    report.extend(docs::check_references(root, &config.doc_references));

    report.finish();
    info!(passed = report.passed(), failed = report.failed(), "drift suite done");
    report
}
