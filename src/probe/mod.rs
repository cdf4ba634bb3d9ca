//! Availability Probe
//!
//! The runner plus the HTTP checker and clocks it is assembled from.

mod clock;
mod http;
mod runner;

pub use clock::{ManualClock, SystemClock};
pub use http::{HttpCheckConfig, HttpChecker, LOCAL_ACCEPT, REMOTE_ACCEPT};
pub use runner::{AvailabilityProbeRunner, ProbeConfig};
