//! Shared state for a suite run.

use pickwatch_core::config::HarnessConfig;
use pickwatch_core::error::HarnessResult;
use pickwatch_core::types::CheckOutcome;
use pickwatch_probe::Prober;

/// Configuration plus the prober, if the run is allowed to touch the
/// network. `SKIP_NETWORK` leaves the prober unset and every network
/// suite emits a single Skip outcome instead of probing.
pub struct AuditContext {
    pub config: HarnessConfig,
    prober: Option<Prober>,
}

impl AuditContext {
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        let prober = if config.target.skip_network {
            None
        } else {
            Some(Prober::from_config(&config)?)
        };
        Ok(Self { config, prober })
    }

    /// Build a context that never probes, regardless of config.
    pub fn offline(config: HarnessConfig) -> Self {
        Self {
            config,
            prober: None,
        }
    }

    pub fn prober(&self) -> Option<&Prober> {
        self.prober.as_ref()
    }

    /// The standard Skip outcome emitted when the network is off.
    pub fn network_skip(endpoint: &str) -> CheckOutcome {
        CheckOutcome::skip("fetch", "SKIP_NETWORK set").with_endpoint(endpoint)
    }
}
