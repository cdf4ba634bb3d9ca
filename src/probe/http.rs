//! HTTP Checker
//!
//! Performs the GET requests behind the remote and local probe scenarios.
//! The status code is logged and returned but never judged; only transport
//! errors and undecodable bodies fail a check.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::domain::ports::{HttpProbe, LocalCheck, RemoteCheck};
use crate::domain::records::Repository;
use crate::error::{Error, Result};

/// Media type requested from the remote JSON API
pub const REMOTE_ACCEPT: &str = "application/vnd.github.v3+json";

/// Media type requested from the local endpoint
pub const LOCAL_ACCEPT: &str = "text/html";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the HTTP checker
#[derive(Debug, Clone)]
pub struct HttpCheckConfig {
    /// Per-request timeout
    pub request_timeout: Duration,

    /// User-Agent sent to the remote JSON API
    pub remote_user_agent: String,

    /// User-Agent sent to the local endpoint
    pub local_user_agent: String,
}

impl Default for HttpCheckConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            remote_user_agent: "Availprobe Repository Reporter".to_string(),
            local_user_agent: concat!("availprobe/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// =============================================================================
// HTTP Checker
// =============================================================================

/// reqwest-backed implementation of [`HttpProbe`].
#[derive(Debug, Clone)]
pub struct HttpChecker {
    config: HttpCheckConfig,
    client: Client,
}

impl HttpChecker {
    /// Create a new checker
    pub fn new(config: HttpCheckConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Get the checker configuration
    pub fn config(&self) -> &HttpCheckConfig {
        &self.config
    }
}

#[async_trait]
impl HttpProbe for HttpChecker {
    #[instrument(skip(self))]
    async fn check_remote(&self, url: &str) -> Result<RemoteCheck> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, REMOTE_ACCEPT)
            .header(USER_AGENT, &self.config.remote_user_agent)
            .send()
            .await
            .map_err(Error::probe_failed)?;

        let status = response.status();
        info!("Remote check responded with {}", status);

        let repositories: Vec<Repository> =
            response.json().await.map_err(Error::probe_failed)?;

        debug!("Decoded {} repositories", repositories.len());

        Ok(RemoteCheck {
            status: status.as_u16(),
            repositories,
        })
    }

    #[instrument(skip(self))]
    async fn check_local(&self, url: &str) -> Result<LocalCheck> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, LOCAL_ACCEPT)
            .header(USER_AGENT, &self.config.local_user_agent)
            .send()
            .await
            .map_err(Error::probe_failed)?;

        let status = response.status();
        info!("Local check responded with {}", status);

        let body = response.text().await.map_err(Error::probe_failed)?;

        Ok(LocalCheck {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/", addr)
    }

    #[test]
    fn test_checker_creation() {
        let checker = HttpChecker::new(HttpCheckConfig::default());
        assert!(checker.is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = HttpCheckConfig::default();

        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.local_user_agent.starts_with("availprobe/"));
        assert!(!config.remote_user_agent.is_empty());
    }

    #[tokio::test]
    async fn test_local_connection_refused() {
        let checker = HttpChecker::new(HttpCheckConfig {
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        let result = checker.check_local(&closed_port_url()).await;

        assert_matches!(result, Err(Error::ProbeFailed { source: Some(_), .. }));
    }

    #[tokio::test]
    async fn test_remote_connection_refused() {
        let checker = HttpChecker::new(HttpCheckConfig {
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        let result = checker.check_remote(&closed_port_url()).await;

        let err = result.unwrap_err();
        assert!(err.is_probe_failure());
        assert!(err.to_string().to_lowercase().contains("refused"), "{}", err);
    }

    #[tokio::test]
    async fn test_invalid_url_is_probe_failure() {
        let checker = HttpChecker::new(HttpCheckConfig::default()).unwrap();

        let result = checker.check_local("not a url").await;

        assert_matches!(result, Err(Error::ProbeFailed { .. }));
    }
}
