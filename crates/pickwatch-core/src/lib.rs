pub mod config;
pub mod error;
pub mod etwindow;
pub mod jsonpath;
pub mod types;

pub use config::HarnessConfig;
pub use error::{HarnessError, HarnessResult};
pub use types::*;
