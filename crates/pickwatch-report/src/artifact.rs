//! Artifact emission for CI.
//!
//! Each suite run writes a JSON report, the rendered text log, and a
//! sha256 sidecar of the JSON so downstream tooling can spot truncated
//! uploads.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;

use pickwatch_core::error::HarnessResult;
use pickwatch_core::types::SuiteReport;

use crate::console::{ColorMode, render_report};

/// Paths produced by one artifact write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub json: PathBuf,
    pub log: PathBuf,
    pub checksum: PathBuf,
}

/// Write `<suite>-<epoch>.json`, `.log`, and `.json.sha256` under `dir`.
pub fn write_artifacts(dir: &Path, report: &SuiteReport) -> HarnessResult<ArtifactPaths> {
    std::fs::create_dir_all(dir)?;

    let stem = format!("{}-{}", report.suite, report.started_at);
    let json_path = dir.join(format!("{stem}.json"));
    let log_path = dir.join(format!("{stem}.log"));
    let checksum_path = dir.join(format!("{stem}.json.sha256"));

    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    std::fs::write(&json_path, &json)?;

    let digest = Sha256::digest(json.as_bytes());
    std::fs::write(&checksum_path, format!("{}\n", hex::encode(digest)))?;

    std::fs::write(&log_path, render_report(report, ColorMode::Never))?;

    info!(suite = %report.suite, path = %json_path.display(), "artifacts written");
    Ok(ArtifactPaths {
        json: json_path,
        log: log_path,
        checksum: checksum_path,
    })
}
