//! Audit suites for the picks API.
//!
//! Each suite separates fetching from assessment: `assess_*` functions
//! are pure over a parsed JSON body so invariants are unit-testable
//! without a live backend.

pub mod best_bets;
pub mod context;
pub mod full;
pub mod gate;
pub mod health;
pub mod integrations;
pub mod ops;

pub use context::AuditContext;
