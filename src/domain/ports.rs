//! Domain Ports (Port/Adapter Pattern)
//!
//! Abstractions the probe runner depends on. Adapters in
//! [`crate::adapters`] and [`crate::probe`] provide the implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Domain Layer                            │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                    Ports (Traits)                    │    │
//! │  │  ObservabilitySink │ HttpProbe │ Clock │ Telemetry  │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Infrastructure Layer                       │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                  Adapters (Impls)                    │    │
//! │  │  IngestionSink │ LoggingSink │ HttpChecker │ Empty  │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::records::{AvailabilityRecord, FailureRecord, Repository};
use crate::error::Result;

// =============================================================================
// Observability Sink Port
// =============================================================================

/// Port for submitting availability telemetry.
///
/// Delivery guarantees, retries and the backend's wire format belong to the
/// implementation. The runner calls `record_failure` (only on failure),
/// then `record_availability`, then `flush`, once each per run.
#[async_trait]
pub trait ObservabilitySink: Send + Sync {
    /// Submit the availability record of a run.
    async fn record_availability(&self, record: AvailabilityRecord) -> Result<()>;

    /// Submit the exception detail of a failed run.
    async fn record_failure(&self, record: FailureRecord) -> Result<()>;

    /// Push any buffered telemetry to the backend now.
    async fn flush(&self) -> Result<()>;
}

// =============================================================================
// HTTP Probe Port
// =============================================================================

/// Outcome of the remote JSON API check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCheck {
    /// HTTP status code. Informational only.
    pub status: u16,
    pub repositories: Vec<Repository>,
}

/// Outcome of the local HTML endpoint check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCheck {
    /// HTTP status code. Informational only.
    pub status: u16,
    pub body: String,
}

/// Port for the HTTP exchanges performed by a probe.
///
/// Implementations return `Err` for transport failures and malformed
/// bodies. A non-2xx status is not an error.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// GET a JSON list of repositories.
    async fn check_remote(&self, url: &str) -> Result<RemoteCheck>;

    /// GET an HTML page and read it fully.
    async fn check_local(&self, url: &str) -> Result<LocalCheck>;
}

// =============================================================================
// Clock Port
// =============================================================================

/// Time source for measuring probe duration and stamping records.
pub trait Clock: Send + Sync {
    /// Monotonic instant used for elapsed-time measurement
    fn now(&self) -> Instant;

    /// Wall-clock time used for record timestamps
    fn utc_now(&self) -> DateTime<Utc>;
}

// =============================================================================
// Telemetry Provider Port
// =============================================================================

/// Client the telemetry provider forwards to.
pub trait TelemetryClient: Send + Sync {
    fn track_event(&self, message: &str);

    fn track_trace(&self, message: &str);
}

/// Telemetry capability set used by application code.
///
/// Every method must be safe to call with any input and must never fail.
pub trait TelemetryProvider: Send + Sync {
    /// Track a named event.
    fn track_event(&self, message: &str);

    /// Track a named event with properties and measurements.
    fn track_event_with(
        &self,
        message: &str,
        properties: &HashMap<String, String>,
        measurements: &HashMap<String, f64>,
    );

    /// Track an error.
    fn track_exception(&self, error: &(dyn std::error::Error + 'static));

    /// Track a trace message.
    fn track_trace(&self, message: &str);
}
