//! Logging setup and the run log artifact.

pub mod run_log;

pub use run_log::{RunLog, file_layer, init_tracing};
