//! Domain Layer
//!
//! Records, targets and the ports the probe runner depends on.
//!
//! - **Records** (`records.rs`) - Availability and failure records
//! - **Target** (`target.rs`) - The closed set of probe scenarios
//! - **Ports** (`ports.rs`) - Trait abstractions for external collaborators
//!
//! # Usage
//!
//! ```ignore
//! use availprobe::domain::{ObservabilitySink, ProbeTarget};
//!
//! async fn report<S: ObservabilitySink>(sink: &S, record: AvailabilityRecord) -> Result<()> {
//!     sink.record_availability(record).await?;
//!     sink.flush().await
//! }
//! ```

pub mod ports;
pub mod records;
pub mod target;

pub use ports::{
    Clock, HttpProbe, LocalCheck, ObservabilitySink, RemoteCheck, TelemetryClient,
    TelemetryProvider,
};
pub use records::{
    AvailabilityRecord, CorrelationId, FailureRecord, Repository, SERVER_PROPERTY,
    TEST_URL_PROPERTY,
};
pub use target::ProbeTarget;
