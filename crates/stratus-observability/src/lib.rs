//! Observability for the Stratus cloud SDK.
//!
//! This crate provides:
//! - `ClientLogger` - One structured entry per service call
//! - `LogEntry` - The serializable call record

mod logging;

pub use logging::*;

// Re-export the level and format types from stratus-core for convenience
pub use stratus_core::{LogFormat, LogLevel};
