//! Observability subsystem.
//!
//! Structured logging is initialized in `main` via `tracing-subscriber`;
//! this module owns the metrics exporter and recording helpers.

pub mod metrics;
