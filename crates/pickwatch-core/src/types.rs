//! Shared types used across pickwatch crates.

use serde::{Deserialize, Serialize};

/// Outcome status of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Assertion held.
    Pass,
    /// Assertion violated or probe failed.
    Fail,
    /// Suspicious but not a gate-blocker (e.g. empty picks with ALLOW_EMPTY).
    Warn,
    /// Not executed (e.g. SKIP_NETWORK).
    Skip,
}

impl CheckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warn => "WARN",
            CheckStatus::Skip => "SKIP",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "✅",
            CheckStatus::Fail => "❌",
            CheckStatus::Warn => "⚠️",
            CheckStatus::Skip => "⏭️",
        }
    }
}

/// Result of a single named check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Check name, e.g. "best_bets.nba.titanium_rule".
    pub name: String,
    pub status: CheckStatus,
    /// Human-readable detail, shown on the PASS/FAIL line.
    pub detail: String,
    /// Endpoint probed, when the check hit the network.
    pub endpoint: Option<String>,
}

impl CheckOutcome {
    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Pass, detail)
    }

    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Fail, detail)
    }

    pub fn warn(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Warn, detail)
    }

    pub fn skip(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Skip, detail)
    }

    fn new(name: impl Into<String>, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            detail: detail.into(),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Accumulated results of one suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite: String,
    pub outcomes: Vec<CheckOutcome>,
    pub started_at: u64,
    pub finished_at: u64,
}

impl SuiteReport {
    pub fn new(suite: impl Into<String>) -> Self {
        let now = epoch_secs();
        Self {
            suite: suite.into(),
            outcomes: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn push(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend(&mut self, outcomes: Vec<CheckOutcome>) {
        self.outcomes.extend(outcomes);
    }

    /// Merge another suite's outcomes, prefixing names with its suite name.
    pub fn absorb(&mut self, other: SuiteReport) {
        for mut outcome in other.outcomes {
            outcome.name = format!("{}.{}", other.suite, outcome.name);
            self.outcomes.push(outcome);
        }
        self.finished_at = epoch_secs();
    }

    pub fn finish(&mut self) {
        self.finished_at = epoch_secs();
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn passed(&self) -> usize {
        self.count(CheckStatus::Pass)
    }

    pub fn failed(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    pub fn warned(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    pub fn skipped(&self) -> usize {
        self.count(CheckStatus::Skip)
    }

    /// Zero failures. Warns and skips do not block the gate.
    pub fn is_green(&self) -> bool {
        self.failed() == 0
    }
}

/// Pick tier as reported by the external API, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Titanium,
    Gold,
    Silver,
    Standard,
}

impl Tier {
    /// Parse the API's tier string, case-insensitively.
    pub fn parse(s: &str) -> Option<Tier> {
        match s.trim().to_ascii_lowercase().as_str() {
            "titanium" => Some(Tier::Titanium),
            "gold" => Some(Tier::Gold),
            "silver" => Some(Tier::Silver),
            "standard" => Some(Tier::Standard),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Titanium => "TITANIUM",
            Tier::Gold => "GOLD",
            Tier::Silver => "SILVER",
            Tier::Standard => "STANDARD",
        }
    }
}

/// Seconds since the Unix epoch.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
