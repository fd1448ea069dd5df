//! Command implementations

mod coverage;
mod render;
mod run;

pub use coverage::run_coverage;
pub use run::run_discovery;
