//! Telemetry Provider Adapters
//!
//! `EmptyTelemetryProvider` stands in for a real provider: it forwards plain
//! events and traces to its client and drops everything else.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{TelemetryClient, TelemetryProvider};

/// Client that emits events and traces through tracing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetryClient;

impl TelemetryClient for TracingTelemetryClient {
    fn track_event(&self, message: &str) {
        info!(telemetry = "event", "{}", message);
    }

    fn track_trace(&self, message: &str) {
        info!(telemetry = "trace", "{}", message);
    }
}

/// Mostly no-op telemetry provider.
pub struct EmptyTelemetryProvider {
    client: Arc<dyn TelemetryClient>,
}

impl EmptyTelemetryProvider {
    pub fn new(client: Arc<dyn TelemetryClient>) -> Self {
        Self { client }
    }
}

impl Default for EmptyTelemetryProvider {
    fn default() -> Self {
        Self::new(Arc::new(TracingTelemetryClient))
    }
}

impl std::fmt::Debug for EmptyTelemetryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmptyTelemetryProvider").finish_non_exhaustive()
    }
}

impl TelemetryProvider for EmptyTelemetryProvider {
    fn track_event(&self, message: &str) {
        self.client.track_event(message);
    }

    fn track_event_with(
        &self,
        _message: &str,
        _properties: &HashMap<String, String>,
        _measurements: &HashMap<String, f64>,
    ) {
    }

    fn track_exception(&self, _error: &(dyn std::error::Error + 'static)) {}

    fn track_trace(&self, message: &str) {
        self.client.track_trace(message);
    }
}
