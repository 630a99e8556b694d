//! Error taxonomy for the verification harness.
//!
//! Mirrors the failure classes every probe can hit: network-level
//! failure, non-2xx status, and unparseable JSON. Assertion failures
//! surface as Fail outcomes, not errors; `Config` and `Io` cover the
//! harness's own plumbing.

use thiserror::Error;

/// Result type alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while probing or asserting.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("network failure for {endpoint}: {reason}")]
    Network { endpoint: String, reason: String },

    #[error("unexpected status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("invalid JSON from {endpoint}: {reason}")]
    Json { endpoint: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Whether a retry could plausibly clear this error.
    ///
    /// Network errors, non-2xx statuses, and invalid JSON are treated as
    /// transient; config and io errors are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            HarnessError::Network { .. } | HarnessError::Status { .. } | HarnessError::Json { .. }
        )
    }
}
