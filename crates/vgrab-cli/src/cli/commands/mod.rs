//! CLI command handlers, one per file.

mod fetch;
mod probe;
mod sweep;

pub use fetch::run_fetch;
pub use probe::run_probe;
pub use sweep::run_sweep;
