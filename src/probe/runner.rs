//! Availability Probe Runner
//!
//! Runs one probe-and-report cycle:
//!
//! ```text
//! start ──▶ dispatch(target) ──▶ classify ──▶ report failure? ──▶ report availability ──▶ flush
//! ```
//!
//! The dispatched probe's outcome is captured as a value (panics included),
//! so the reporting and flush steps run on every path. `run` itself never
//! fails; sink errors are logged and swallowed.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, info, instrument, warn};

use crate::domain::ports::{Clock, HttpProbe, ObservabilitySink};
use crate::domain::records::{
    AvailabilityRecord, CorrelationId, FailureRecord, SERVER_PROPERTY, TEST_URL_PROPERTY,
};
use crate::domain::target::ProbeTarget;
use crate::error::{Error, Result};
use crate::probe::clock::SystemClock;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the probe runner
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Test name reported with every record
    pub test_name: String,

    /// Run location label
    pub location: String,

    /// Value of the `Server` property added on success
    pub server_name: String,

    /// Message set on success
    pub success_message: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            test_name: "AvailabilityTestConsole".to_string(),
            location: "local".to_string(),
            server_name: "localhost".to_string(),
            success_message: "Availability test from Console".to_string(),
        }
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Executes availability probes and reports them to a sink.
pub struct AvailabilityProbeRunner {
    config: ProbeConfig,
    http: Arc<dyn HttpProbe>,
    sink: Arc<dyn ObservabilitySink>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityProbeRunner {
    /// Create a runner timed by the system clock
    pub fn new(
        config: ProbeConfig,
        http: Arc<dyn HttpProbe>,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Self {
        Self {
            config,
            http,
            sink,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the runner configuration
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run one probe against `target` and report it.
    ///
    /// Returns the availability record exactly as it was handed to the sink.
    #[instrument(skip(self, target), fields(probe = %target, test_name = %self.config.test_name))]
    pub async fn run(&self, target: ProbeTarget) -> AvailabilityRecord {
        info!("Entering run at: {}", self.clock.utc_now());

        let mut record = AvailabilityRecord::new(
            CorrelationId::generate(),
            &self.config.test_name,
            &self.config.location,
            self.clock.utc_now(),
        );
        let started = self.clock.now();

        info!(correlation_id = %record.id, "Executing availability test run");

        let outcome = AssertUnwindSafe(self.execute(&target, &mut record))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(Error::probe_panicked(panic_message(panic.as_ref()))));

        match outcome {
            Ok(()) => {
                record.mark_succeeded(&self.config.success_message);
                record.add_property(SERVER_PROPERTY, &self.config.server_name);
            }
            Err(err) => {
                let description = err.into_probe_failure().to_string();
                warn!(correlation_id = %record.id, error = %description, "Availability test failed");

                record.mark_failed(description.clone());
                let failure =
                    FailureRecord::for_record(&record, description, self.clock.utc_now());
                self.report_failure(failure).await;
            }
        }

        let duration = self.clock.now().saturating_duration_since(started);
        record.complete(duration, self.clock.utc_now());

        self.report_availability(record.clone()).await;
        self.flush().await;

        info!(
            correlation_id = %record.id,
            success = record.success,
            duration_ms = record.duration.as_millis() as u64,
            "Availability test completed"
        );

        record
    }

    /// Perform the scenario selected by `target`.
    async fn execute(&self, target: &ProbeTarget, record: &mut AvailabilityRecord) -> Result<()> {
        match target {
            ProbeTarget::RemoteHttpCheck(url) => {
                record.add_property(TEST_URL_PROPERTY, url.as_str());

                let check = self.http.check_remote(url).await?;

                for repo in &check.repositories {
                    info!("{} - {}", repo.name, repo.home_url);
                }
            }
            ProbeTarget::LocalHttpCheck(url) => {
                let check = self.http.check_local(url).await?;
                debug!(bytes = check.body.len(), "{}", check.body);

                record.add_property(TEST_URL_PROPERTY, url.as_str());
            }
            ProbeTarget::Unconfigured => return Err(Error::not_implemented()),
        }

        Ok(())
    }

    async fn report_failure(&self, failure: FailureRecord) {
        if let Err(e) = self.sink.record_failure(failure).await {
            warn!("Failed to record failure telemetry: {}", e);
        }
    }

    async fn report_availability(&self, record: AvailabilityRecord) {
        if let Err(e) = self.sink.record_availability(record).await {
            warn!("Failed to record availability telemetry: {}", e);
        }
    }

    async fn flush(&self) {
        if let Err(e) = self.sink.flush().await {
            warn!("Failed to flush telemetry: {}", e);
        }
    }
}

impl std::fmt::Debug for AvailabilityProbeRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityProbeRunner")
            .field("config", &self.config)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
