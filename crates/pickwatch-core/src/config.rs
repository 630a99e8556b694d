//! pickwatch.toml configuration parser with environment overrides.
//!
//! The file supplies defaults; `BASE_URL`, `API_KEY`, `ADMIN_TOKEN`,
//! `SKIP_NETWORK`, `ALLOW_EMPTY`, and `ARTIFACTS_DIR` override it so CI
//! can retarget the harness without editing the config.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub suites: SuitesConfig,
    #[serde(default)]
    pub drift: DriftConfig,
    #[serde(default)]
    pub artifacts_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the picks API, e.g. "http://api.internal:8080".
    /// Empty only passes validation with `skip_network` set.
    pub base_url: String,
    pub api_key: Option<String>,
    pub admin_token: Option<String>,
    /// Per-request timeout, e.g. "10s" or "500ms".
    pub timeout: String,
    /// Skip every network suite (drift scans still run).
    pub skip_network: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            admin_token: None,
            timeout: default_timeout(),
            skip_network: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Initial backoff between attempts, e.g. "1s".
    pub base_backoff: String,
    /// Backoff ceiling, e.g. "30s".
    pub max_backoff: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff: "1s".to_string(),
            max_backoff: "30s".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuitesConfig {
    /// Sports probed by the best-bets suite.
    pub sports: Vec<String>,
    /// Engine score floor for the Titanium rule.
    pub titanium_score_floor: f64,
    /// Engines that must clear the floor for a Titanium pick.
    pub titanium_engines_required: usize,
    /// Engines every pick is expected to carry.
    pub engine_count: usize,
    /// Empty picks arrays degrade Fail to Warn.
    pub allow_empty: bool,
    /// Integrations that must be present and enabled.
    pub expected_integrations: Vec<String>,
    /// Minimum number of registered integrations.
    pub min_integrations: usize,
    /// Storage backlog above this fails the storage suite.
    pub max_storage_backlog: u64,
}

impl Default for SuitesConfig {
    fn default() -> Self {
        Self {
            sports: vec![
                "nba".to_string(),
                "nfl".to_string(),
                "mlb".to_string(),
                "nhl".to_string(),
            ],
            titanium_score_floor: 8.0,
            titanium_engines_required: 3,
            engine_count: 4,
            allow_empty: false,
            expected_integrations: Vec::new(),
            min_integrations: 1,
            max_storage_backlog: 1000,
        }
    }
}

/// Source-tree drift scan rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Root of the tree to scan. Defaults to the current directory.
    pub scan_root: Option<String>,
    /// Forbidden-literal rules. Empty falls back to the built-in set.
    #[serde(default)]
    pub forbidden: Vec<ForbiddenRule>,
    #[serde(default)]
    pub doc_references: Vec<DocReferenceRule>,
}

/// A regex that must not appear in files matching the extension filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForbiddenRule {
    pub name: String,
    pub pattern: String,
    /// File extensions to scan, e.g. ["py", "sh"]. Empty scans everything.
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// A source path that must be mentioned in a documentation file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocReferenceRule {
    /// Path that must be referenced, e.g. "core/scoring_contract.py".
    pub source: String,
    /// Document that must mention it, relative to the scan root.
    pub doc: String,
}

fn default_timeout() -> String {
    "10s".to_string()
}

impl HarnessConfig {
    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: HarnessConfig = toml::from_str(&content)
            .map_err(|e| HarnessError::Config(format!("{}: {e}", path.display())))?;
        config.apply_env();
        Ok(config)
    }

    /// Build a config from environment variables alone (no file).
    pub fn from_env() -> HarnessResult<Self> {
        let mut config = HarnessConfig::default();
        config.apply_env();
        Ok(config)
    }

    /// Environment variables win over file values.
    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("BASE_URL") {
            self.target.base_url = v;
        }
        if let Ok(v) = std::env::var("API_KEY") {
            self.target.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("ADMIN_TOKEN") {
            self.target.admin_token = Some(v);
        }
        if let Ok(v) = std::env::var("SKIP_NETWORK") {
            self.target.skip_network = truthy(&v);
        }
        if let Ok(v) = std::env::var("ALLOW_EMPTY") {
            self.suites.allow_empty = truthy(&v);
        }
        if let Ok(v) = std::env::var("ARTIFACTS_DIR") {
            self.artifacts_dir = Some(v);
        }
    }

    /// Reject configs that cannot run. Called after every override
    /// source (file, env, CLI flags) has been applied.
    pub fn validate(&self) -> HarnessResult<()> {
        if self.target.base_url.is_empty() && !self.target.skip_network {
            return Err(HarnessError::Config(
                "base_url is required (set [target].base_url or BASE_URL)".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(HarnessError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        parse_duration(&self.target.timeout).unwrap_or(Duration::from_secs(10))
    }

    pub fn base_backoff(&self) -> Duration {
        parse_duration(&self.retry.base_backoff).unwrap_or(Duration::from_secs(1))
    }

    pub fn max_backoff(&self) -> Duration {
        parse_duration(&self.retry.max_backoff).unwrap_or(Duration::from_secs(30))
    }

    pub fn artifacts_dir(&self) -> &str {
        self.artifacts_dir.as_deref().unwrap_or("artifacts")
    }
}

fn truthy(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Parse a duration string like "5s", "500ms", "1m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(rest) = s.strip_suffix("ms") {
        rest.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(rest) = s.strip_suffix('s') {
        rest.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(rest) = s.strip_suffix('m') {
        rest.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
