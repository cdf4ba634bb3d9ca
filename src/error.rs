//! Error types for Availprobe

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed underlying cause of a probe failure
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message used when the unconfigured scenario is selected
pub const NOT_IMPLEMENTED_MESSAGE: &str = "The method or operation is not implemented.";

/// Errors that can occur while probing and reporting
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Probe Errors
    // =========================================================================
    /// The probe raised an error.
    ///
    /// Network failures, malformed bodies, the unconfigured scenario and
    /// panics caught during a probe all collapse into this one kind. The
    /// message carries the full cause chain.
    #[error("{message}")]
    ProbeFailed {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    // =========================================================================
    // Telemetry Errors
    // =========================================================================
    /// Telemetry endpoint could not be reached
    #[error("Telemetry transport error: {0}")]
    TelemetryTransport(#[source] reqwest::Error),

    /// Telemetry endpoint refused the submitted envelopes
    #[error("Telemetry endpoint rejected submission with status {status}: {body}")]
    TelemetryRejected { status: u16, body: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // =========================================================================
    // General Errors
    // =========================================================================
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap any underlying cause as a probe failure.
    pub fn probe_failed<E>(cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ProbeFailed {
            message: error_chain(&cause),
            source: Some(Box::new(cause)),
        }
    }

    /// Probe failure raised by the unconfigured scenario.
    pub fn not_implemented() -> Self {
        Self::ProbeFailed {
            message: NOT_IMPLEMENTED_MESSAGE.to_string(),
            source: None,
        }
    }

    /// Probe failure for a panic caught while probing.
    pub fn probe_panicked(detail: impl Into<String>) -> Self {
        Self::ProbeFailed {
            message: format!("Probe panicked: {}", detail.into()),
            source: None,
        }
    }

    /// Check whether this is a probe failure
    pub fn is_probe_failure(&self) -> bool {
        matches!(self, Error::ProbeFailed { .. })
    }

    /// Fold any error into the probe failure kind.
    pub fn into_probe_failure(self) -> Self {
        match self {
            err @ Error::ProbeFailed { .. } => err,
            other => Self::probe_failed(other),
        }
    }
}

/// Render an error and all of its sources as one line.
///
/// Sources whose text is already part of the message are skipped, so
/// wrappers that repeat their inner error don't duplicate it.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }

    message
}
