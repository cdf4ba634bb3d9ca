//! Observability Sink Adapters
//!
//! Implements the `ObservabilitySink` port with local backends.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::domain::ports::ObservabilitySink;
use crate::domain::records::{AvailabilityRecord, FailureRecord};
use crate::error::Result;

/// Logging-based sink.
///
/// Writes each record to the tracing system as a structured event.
#[derive(Debug, Clone, Default)]
pub struct LoggingSink {
    /// Whether to log records at info level (true) or debug level (false)
    info_level: bool,
}

impl LoggingSink {
    /// Create a new logging sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that logs at info level.
    pub fn info_level() -> Self {
        Self { info_level: true }
    }

    /// Create a sink that logs at debug level.
    pub fn debug_level() -> Self {
        Self { info_level: false }
    }
}

#[async_trait]
impl ObservabilitySink for LoggingSink {
    async fn record_availability(&self, record: AvailabilityRecord) -> Result<()> {
        let json = serde_json::to_string(&record).unwrap_or_else(|_| format!("{:?}", record));

        if self.info_level {
            info!(
                correlation_id = %record.id,
                success = record.success,
                duration_ms = record.duration.as_millis() as u64,
                record = %json,
                "Availability"
            );
        } else {
            debug!(correlation_id = %record.id, record = %json, "Availability");
        }

        Ok(())
    }

    async fn record_failure(&self, record: FailureRecord) -> Result<()> {
        let json = serde_json::to_string(&record).unwrap_or_else(|_| format!("{:?}", record));

        if self.info_level {
            info!(correlation_id = %record.correlation_id, record = %json, "Availability failure");
        } else {
            debug!(correlation_id = %record.correlation_id, record = %json, "Availability failure");
        }

        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// A call observed by [`InMemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Availability(AvailabilityRecord),
    Failure(FailureRecord),
    Flush,
}

/// In-memory sink for testing.
///
/// Keeps every call in order for later inspection.
#[derive(Debug, Default)]
pub struct InMemorySink {
    calls: RwLock<Vec<SinkCall>>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get every call in the order it was made.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.read().clone()
    }

    /// Get the submitted availability records.
    pub fn availability_records(&self) -> Vec<AvailabilityRecord> {
        self.calls
            .read()
            .iter()
            .filter_map(|call| match call {
                SinkCall::Availability(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get the submitted failure records.
    pub fn failure_records(&self) -> Vec<FailureRecord> {
        self.calls
            .read()
            .iter()
            .filter_map(|call| match call {
                SinkCall::Failure(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of flushes requested.
    pub fn flush_count(&self) -> usize {
        self.calls
            .read()
            .iter()
            .filter(|call| matches!(call, SinkCall::Flush))
            .count()
    }

    /// Get the count of recorded calls.
    pub fn len(&self) -> usize {
        self.calls.read().len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.calls.read().is_empty()
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.calls.write().clear();
    }
}

#[async_trait]
impl ObservabilitySink for InMemorySink {
    async fn record_availability(&self, record: AvailabilityRecord) -> Result<()> {
        self.calls.write().push(SinkCall::Availability(record));
        Ok(())
    }

    async fn record_failure(&self, record: FailureRecord) -> Result<()> {
        self.calls.write().push(SinkCall::Failure(record));
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.calls.write().push(SinkCall::Flush);
        Ok(())
    }
}

/// Composite sink that forwards to multiple backends in order.
///
/// Every backend sees every call; the first error is returned afterwards.
#[derive(Default)]
pub struct CompositeSink {
    sinks: Vec<Arc<dyn ObservabilitySink>>,
}

impl CompositeSink {
    /// Create a new composite sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink to the composite.
    pub fn with_sink<S: ObservabilitySink + 'static>(self, sink: S) -> Self {
        self.with_shared(Arc::new(sink))
    }

    /// Add a sink that is also held elsewhere.
    pub fn with_shared(mut self, sink: Arc<dyn ObservabilitySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of wrapped sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for CompositeSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeSink")
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

impl CompositeSink {
    /// Log every sink error and return the first one.
    fn first_error(results: Vec<Result<()>>, operation: &str) -> Result<()> {
        let mut first = None;
        for result in results {
            if let Err(e) = result {
                warn!("Sink failed to {}: {}", operation, e);
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl ObservabilitySink for CompositeSink {
    async fn record_availability(&self, record: AvailabilityRecord) -> Result<()> {
        let mut results = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            results.push(sink.record_availability(record.clone()).await);
        }
        Self::first_error(results, "record availability")
    }

    async fn record_failure(&self, record: FailureRecord) -> Result<()> {
        let mut results = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            results.push(sink.record_failure(record.clone()).await);
        }
        Self::first_error(results, "record failure")
    }

    async fn flush(&self) -> Result<()> {
        let mut results = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            results.push(sink.flush().await);
        }
        Self::first_error(results, "flush")
    }
}
