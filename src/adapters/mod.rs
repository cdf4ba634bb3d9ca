//! Infrastructure Adapters
//!
//! Adapter implementations for the domain ports, following the
//! Port/Adapter (Hexagonal) architecture pattern.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Layer                              │
//! │  ┌────────────────────────────────────────────────────────────┐ │
//! │  │                    Ports (Traits)                           │ │
//! │  │        ObservabilitySink │ TelemetryProvider               │ │
//! │  └────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters (This Module)                       │
//! │  ┌────────────────────────────────────────────────────────────┐ │
//! │  │ IngestionSink │ LoggingSink │ InMemorySink │ CompositeSink │ │
//! │  │ EmptyTelemetryProvider │ TracingTelemetryClient            │ │
//! │  └────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use availprobe::adapters::{CompositeSink, IngestionSink, LoggingSink, TelemetryConfig};
//!
//! let sink = CompositeSink::new()
//!     .with_sink(LoggingSink::info_level())
//!     .with_sink(IngestionSink::new(TelemetryConfig { .. })?);
//! ```

mod ingestion;
mod sink;
mod telemetry_provider;

pub use ingestion::{
    format_timespan, AvailabilityData, BaseData, Envelope, EnvelopeData, ExceptionData,
    ExceptionDetails, IngestionSink, TelemetryConfig, DEFAULT_ENDPOINT,
};
pub use sink::{CompositeSink, InMemorySink, LoggingSink, SinkCall};
pub use telemetry_provider::{EmptyTelemetryProvider, TracingTelemetryClient};
