//! Logging and metrics setup shared by the CDC binaries.

pub mod metrics;
pub mod tracing;
