//! Continuous endpoint monitor — drives the `pickwatch watch` mode.
//!
//! Spawns a background task per endpoint that probes on an interval,
//! backing off while the endpoint is down. Latest health per endpoint is
//! kept in memory for the renderer to poll.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::checker::{Auth, ProbeOutcome, Prober};

/// Health of a monitored endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointHealth {
    Up,
    Down,
    Unknown,
}

/// Tracks consecutive probe results for one endpoint.
#[derive(Debug)]
pub struct ProbeTracker {
    health: EndpointHealth,
    consecutive_failures: u32,
    down_threshold: u32,
    current_backoff: Duration,
    base_interval: Duration,
    max_backoff: Duration,
}

impl ProbeTracker {
    pub fn new(down_threshold: u32, interval: Duration, max_backoff: Duration) -> Self {
        Self {
            health: EndpointHealth::Unknown,
            consecutive_failures: 0,
            down_threshold: down_threshold.max(1),
            current_backoff: interval,
            base_interval: interval,
            max_backoff,
        }
    }

    /// Record a probe outcome and return the new health.
    ///
    /// A single 2xx recovers a down endpoint. Non-2xx and connection
    /// failures both count against the threshold.
    pub fn record(&mut self, outcome: &ProbeOutcome) -> EndpointHealth {
        match outcome {
            ProbeOutcome::Ok { .. } => {
                self.consecutive_failures = 0;
                self.current_backoff = self.base_interval;
                if self.health != EndpointHealth::Up {
                    debug!("endpoint recovered");
                }
                self.health = EndpointHealth::Up;
            }
            ProbeOutcome::HttpError { .. } | ProbeOutcome::Failed { .. } => {
                self.consecutive_failures += 1;
                self.current_backoff = (self.current_backoff * 2).min(self.max_backoff);
                if self.consecutive_failures >= self.down_threshold {
                    if self.health != EndpointHealth::Down {
                        warn!(
                            failures = self.consecutive_failures,
                            threshold = self.down_threshold,
                            "endpoint marked down"
                        );
                    }
                    self.health = EndpointHealth::Down;
                }
            }
        }
        self.health
    }

    pub fn health(&self) -> EndpointHealth {
        self.health
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Interval before the next probe.
    pub fn next_interval(&self) -> Duration {
        self.current_backoff
    }
}

struct MonitorSlot {
    handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

/// Manages probe loops for a set of endpoints.
pub struct EndpointMonitor {
    prober: Prober,
    interval: Duration,
    down_threshold: u32,
    monitors: Arc<RwLock<HashMap<String, MonitorSlot>>>,
    /// Latest health per endpoint path.
    statuses: Arc<RwLock<HashMap<String, EndpointHealth>>>,
}

impl EndpointMonitor {
    pub fn new(prober: Prober, interval: Duration, down_threshold: u32) -> Self {
        Self {
            prober,
            interval,
            down_threshold,
            monitors: Arc::new(RwLock::new(HashMap::new())),
            statuses: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start watching an endpoint. Restarting an already-watched path
    /// replaces the old loop.
    pub async fn start(&self, path: &str, auth: Auth) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let prober = self.prober.clone();
        let path_owned = path.to_string();
        let statuses = self.statuses.clone();
        let mut tracker =
            ProbeTracker::new(self.down_threshold, self.interval, self.interval * 8);

        let handle = tokio::spawn(async move {
            run_probe_loop(prober, path_owned, auth, &mut tracker, statuses, shutdown_rx).await;
        });

        let mut monitors = self.monitors.write().await;
        if let Some(old) = monitors.insert(
            path.to_string(),
            MonitorSlot {
                handle,
                shutdown_tx,
            },
        ) {
            let _ = old.shutdown_tx.send(true);
            old.handle.abort();
        }

        info!(%path, "endpoint monitor started");
    }

    /// Stop watching an endpoint.
    pub async fn stop(&self, path: &str) {
        let mut monitors = self.monitors.write().await;
        if let Some(slot) = monitors.remove(path) {
            let _ = slot.shutdown_tx.send(true);
            slot.handle.abort();
            info!(%path, "endpoint monitor stopped");
        }
    }

    /// Stop every monitor (graceful shutdown).
    pub async fn stop_all(&self) {
        let mut monitors = self.monitors.write().await;
        for (path, slot) in monitors.drain() {
            let _ = slot.shutdown_tx.send(true);
            slot.handle.abort();
            debug!(%path, "endpoint monitor stopped");
        }
        info!("all endpoint monitors stopped");
    }

    /// Paths with an active monitor.
    pub async fn watched_paths(&self) -> Vec<String> {
        let monitors = self.monitors.read().await;
        monitors.keys().cloned().collect()
    }

    /// Latest health snapshot for every watched endpoint.
    pub async fn snapshot(&self) -> HashMap<String, EndpointHealth> {
        self.statuses.read().await.clone()
    }

    pub async fn is_watching(&self, path: &str) -> bool {
        self.monitors.read().await.contains_key(path)
    }
}

async fn run_probe_loop(
    prober: Prober,
    path: String,
    auth: Auth,
    tracker: &mut ProbeTracker,
    statuses: Arc<RwLock<HashMap<String, EndpointHealth>>>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(%path, "probe loop starting");

    loop {
        let interval = tracker.next_interval();

        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let outcome = prober.fetch(&path, auth).await;
                let prev = tracker.health();
                let health = tracker.record(&outcome);

                if health != prev {
                    statuses.write().await.insert(path.clone(), health);
                } else if !statuses.read().await.contains_key(&path) {
                    statuses.write().await.insert(path.clone(), health);
                }
            }
            _ = shutdown.changed() => {
                debug!(%path, "probe loop shutting down");
                break;
            }
        }
    }
}
