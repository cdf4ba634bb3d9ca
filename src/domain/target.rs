//! Probe targets

use serde::{Deserialize, Serialize};

/// Scenario exercised by a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url")]
pub enum ProbeTarget {
    /// JSON API reachable over the network
    RemoteHttpCheck(String),

    /// HTML endpoint on this machine
    LocalHttpCheck(String),

    /// Placeholder scenario that always fails with "not implemented"
    Unconfigured,
}

impl ProbeTarget {
    /// Map the interactive selector to a target.
    ///
    /// `1` selects the remote check, `2` the local check. Anything else,
    /// including input that is not a number at all, selects `Unconfigured`.
    pub fn from_selection(input: &str, remote_url: &str, local_url: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(1) => ProbeTarget::RemoteHttpCheck(remote_url.to_string()),
            Ok(2) => ProbeTarget::LocalHttpCheck(local_url.to_string()),
            _ => ProbeTarget::Unconfigured,
        }
    }

    /// URL probed by this target, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            ProbeTarget::RemoteHttpCheck(url) | ProbeTarget::LocalHttpCheck(url) => Some(url),
            ProbeTarget::Unconfigured => None,
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeTarget::RemoteHttpCheck(_) => "remote",
            ProbeTarget::LocalHttpCheck(_) => "local",
            ProbeTarget::Unconfigured => "unconfigured",
        }
    }
}

impl std::fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.url() {
            Some(url) => write!(f, "{} ({})", self.kind(), url),
            None => write!(f, "{}", self.kind()),
        }
    }
}
