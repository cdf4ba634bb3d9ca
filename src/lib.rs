//! Availprobe - Synthetic Availability Tests
//!
//! Runs a single availability probe against an HTTP endpoint and reports the
//! outcome to an observability sink.
//!
//! # Architecture
//!
//! ```text
//! ProbeTarget → AvailabilityProbeRunner → ObservabilitySink
//!                      │                        │
//!                 HttpProbe, Clock      Logging / Ingestion
//! ```
//!
//! Every run emits exactly one availability record. A failed run also emits
//! a failure record with the same correlation id. The sink is flushed once
//! at the end of every run, whatever happened during the probe.
//!
//! # Modules
//!
//! - [`adapters`] - Sink and telemetry provider implementations
//! - [`domain`] - Records, targets and port traits
//! - [`error`] - Error types
//! - [`probe`] - Probe runner, HTTP checker and clocks

pub mod adapters;
pub mod domain;
pub mod error;
pub mod probe;

// Re-export commonly used types
pub use adapters::{CompositeSink, EmptyTelemetryProvider, IngestionSink, LoggingSink};
pub use domain::{AvailabilityRecord, FailureRecord, ObservabilitySink, ProbeTarget};
pub use error::{Error, Result};
pub use probe::{AvailabilityProbeRunner, HttpChecker, ProbeConfig};
