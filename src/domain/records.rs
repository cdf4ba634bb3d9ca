//! Availability Records
//!
//! Value objects produced by a probe run and handed to an observability
//! sink. A run produces exactly one [`AvailabilityRecord`] and, only when the
//! probe raised an error, one [`FailureRecord`] sharing its correlation id.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Property key holding the probed URL
pub const TEST_URL_PROPERTY: &str = "Test Url";

/// Property key holding the name of the machine that ran the probe
pub const SERVER_PROPERTY: &str = "Server";

// =============================================================================
// Correlation Id
// =============================================================================

/// Opaque identifier linking an availability record to its failure record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id (32 lowercase hex digits, no hyphens).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Availability Record
// =============================================================================

/// Result of one availability test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    /// Correlation id, unique per run
    pub id: CorrelationId,

    /// Test name
    pub name: String,

    /// Free-text run location label
    pub location: String,

    /// Whether the probe completed without raising an error
    pub success: bool,

    /// Completion message, or the error description on failure
    pub message: String,

    /// Elapsed time between run start and completion
    pub duration: Duration,

    /// Point in time the run completed
    pub timestamp: DateTime<Utc>,

    /// Free-form string properties
    pub properties: BTreeMap<String, String>,
}

impl AvailabilityRecord {
    /// Create a record for a run that has just started.
    ///
    /// `success` starts out false so an interrupted run never reads as passed.
    pub fn new(
        id: CorrelationId,
        name: impl Into<String>,
        location: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            location: location.into(),
            success: false,
            message: String::new(),
            duration: Duration::ZERO,
            timestamp: started_at,
            properties: BTreeMap::new(),
        }
    }

    /// Add or replace a property
    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Get a property value
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Mark the run as passed
    pub fn mark_succeeded(&mut self, message: impl Into<String>) {
        self.success = true;
        self.message = message.into();
    }

    /// Mark the run as failed with the error description
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.success = false;
        self.message = message.into();
    }

    /// Stamp the elapsed duration and completion time
    pub fn complete(&mut self, duration: Duration, completed_at: DateTime<Utc>) {
        self.duration = duration;
        self.timestamp = completed_at;
    }
}

// =============================================================================
// Failure Record
// =============================================================================

/// Exception detail reported alongside a failed availability record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Same id as the accompanying availability record
    pub correlation_id: CorrelationId,

    /// Test name
    pub test_name: String,

    /// Run location label
    pub test_location: String,

    /// Description of the underlying error
    pub error: String,

    /// When the failure was observed
    pub timestamp: DateTime<Utc>,
}

impl FailureRecord {
    pub fn new(
        correlation_id: CorrelationId,
        test_name: impl Into<String>,
        test_location: impl Into<String>,
        error: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            correlation_id,
            test_name: test_name.into(),
            test_location: test_location.into(),
            error: error.into(),
            timestamp,
        }
    }

    /// Build the failure record that accompanies `record`, observed at `occurred_at`.
    pub fn for_record(
        record: &AvailabilityRecord,
        error: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            record.id.clone(),
            record.name.clone(),
            record.location.clone(),
            error,
            occurred_at,
        )
    }
}

// =============================================================================
// Remote API Payload
// =============================================================================

/// Repository entry returned by the remote JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    pub name: String,

    #[serde(rename = "html_url")]
    pub home_url: String,
}

// =============================================================================
// Tests
// =============================================================================
