//! Ingestion Sink Adapter
//!
//! Implements the `ObservabilitySink` port against a telemetry ingestion
//! endpoint. Records are converted to envelopes and held in memory until
//! `flush`, which posts everything buffered so far as one JSON array and
//! empties the buffer. Nothing is retried: a failed flush drops its
//! envelopes and reports the error.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::ports::ObservabilitySink;
use crate::domain::records::{AvailabilityRecord, FailureRecord};
use crate::error::{Error, Result};

/// Default ingestion endpoint
pub const DEFAULT_ENDPOINT: &str = "https://dc.services.visualstudio.com/v2/track";

const OPERATION_ID_TAG: &str = "ai.operation.id";
const FAILURE_TYPE_NAME: &str = "ProbeFailed";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the ingestion sink
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Instrumentation key identifying the telemetry resource
    pub instrumentation_key: String,

    /// Ingestion endpoint URL
    pub endpoint: String,

    /// Timeout for a flush request
    pub request_timeout: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            instrumentation_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

// =============================================================================
// Envelopes
// =============================================================================

/// A telemetry item as submitted to the ingestion endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub name: String,
    pub time: DateTime<Utc>,
    pub i_key: String,
    pub tags: BTreeMap<String, String>,
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeData {
    pub base_type: String,
    pub base_data: BaseData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BaseData {
    Availability(AvailabilityData),
    Exception(ExceptionData),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityData {
    pub ver: u32,
    pub id: String,
    pub name: String,
    pub duration: String,
    pub success: bool,
    pub run_location: String,
    pub message: String,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionData {
    pub ver: u32,
    pub exceptions: Vec<ExceptionDetails>,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    pub type_name: String,
    pub message: String,
    pub has_full_stack: bool,
}

impl Envelope {
    /// Envelope for an availability record
    pub fn availability(instrumentation_key: &str, record: &AvailabilityRecord) -> Self {
        Self {
            name: envelope_name(instrumentation_key, "Availability"),
            time: record.timestamp,
            i_key: instrumentation_key.to_string(),
            tags: operation_tags(record.id.as_str()),
            data: EnvelopeData {
                base_type: "AvailabilityData".to_string(),
                base_data: BaseData::Availability(AvailabilityData {
                    ver: 2,
                    id: record.id.to_string(),
                    name: record.name.clone(),
                    duration: format_timespan(record.duration),
                    success: record.success,
                    run_location: record.location.clone(),
                    message: record.message.clone(),
                    properties: record.properties.clone(),
                }),
            },
        }
    }

    /// Envelope for a failure record, stamped with its observation time
    pub fn failure(instrumentation_key: &str, record: &FailureRecord) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert("TestName".to_string(), record.test_name.clone());
        properties.insert("TestLocation".to_string(), record.test_location.clone());

        Self {
            name: envelope_name(instrumentation_key, "Exception"),
            time: record.timestamp,
            i_key: instrumentation_key.to_string(),
            tags: operation_tags(record.correlation_id.as_str()),
            data: EnvelopeData {
                base_type: "ExceptionData".to_string(),
                base_data: BaseData::Exception(ExceptionData {
                    ver: 2,
                    exceptions: vec![ExceptionDetails {
                        type_name: FAILURE_TYPE_NAME.to_string(),
                        message: record.error.clone(),
                        has_full_stack: false,
                    }],
                    properties,
                }),
            },
        }
    }
}

fn envelope_name(instrumentation_key: &str, kind: &str) -> String {
    let key: String = instrumentation_key.chars().filter(|c| *c != '-').collect();
    if key.is_empty() {
        format!("Microsoft.ApplicationInsights.{}", kind)
    } else {
        format!("Microsoft.ApplicationInsights.{}.{}", key, kind)
    }
}

fn operation_tags(operation_id: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert(OPERATION_ID_TAG.to_string(), operation_id.to_string());
    tags
}

/// Format a duration as `[d.]hh:mm:ss.fffffff`.
pub fn format_timespan(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    let ticks = duration.subsec_nanos() / 100;

    if days > 0 {
        format!("{}.{:02}:{:02}:{:02}.{:07}", days, hours, minutes, seconds, ticks)
    } else {
        format!("{:02}:{:02}:{:02}.{:07}", hours, minutes, seconds, ticks)
    }
}

// =============================================================================
// Ingestion Sink
// =============================================================================

/// Buffers envelopes and posts them to the ingestion endpoint on flush.
pub struct IngestionSink {
    config: TelemetryConfig,
    client: Client,
    buffer: Mutex<Vec<Envelope>>,
}

impl IngestionSink {
    /// Create a new ingestion sink
    pub fn new(config: TelemetryConfig) -> Result<Self> {
        if config.instrumentation_key.trim().is_empty() {
            return Err(Error::Config("instrumentation key must not be empty".into()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            buffer: Mutex::new(Vec::new()),
        })
    }

    /// Number of envelopes waiting for the next flush
    pub fn buffered(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Get the sink configuration
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    fn enqueue(&self, envelope: Envelope) {
        self.buffer.lock().push(envelope);
    }
}

impl std::fmt::Debug for IngestionSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionSink")
            .field("endpoint", &self.config.endpoint)
            .field("buffered", &self.buffered())
            .finish()
    }
}

#[async_trait]
impl ObservabilitySink for IngestionSink {
    async fn record_availability(&self, record: AvailabilityRecord) -> Result<()> {
        self.enqueue(Envelope::availability(&self.config.instrumentation_key, &record));
        Ok(())
    }

    async fn record_failure(&self, record: FailureRecord) -> Result<()> {
        self.enqueue(Envelope::failure(&self.config.instrumentation_key, &record));
        Ok(())
    }

    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    async fn flush(&self) -> Result<()> {
        let envelopes = std::mem::take(&mut *self.buffer.lock());
        if envelopes.is_empty() {
            debug!("Nothing to flush");
            return Ok(());
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&envelopes)
            .send()
            .await
            .map_err(Error::TelemetryTransport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TelemetryRejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Flushed {} telemetry items", envelopes.len());
        Ok(())
    }
}
