pub mod artifact;
pub mod console;

pub use artifact::{ArtifactPaths, write_artifacts};
pub use console::{ColorMode, render_report, render_summary};
