pub mod checker;
pub mod monitor;
pub mod retry;

pub use checker::{Auth, ProbeOutcome, Prober, TargetUrl};
pub use monitor::{EndpointHealth, EndpointMonitor, ProbeTracker};
pub use retry::RetryPolicy;
