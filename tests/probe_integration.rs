//! Availprobe Integration Tests
//!
//! Exercises the runner against real HTTP endpoints served locally:
//! - Local and remote checks against a hyper server
//! - Connection refused on a closed port
//! - Telemetry delivery through the ingestion sink

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use tokio::net::TcpListener;

use availprobe::adapters::{CompositeSink, InMemorySink, IngestionSink, TelemetryConfig};
use availprobe::domain::{ObservabilitySink, ProbeTarget, SERVER_PROPERTY, TEST_URL_PROPERTY};
use availprobe::probe::{
    AvailabilityProbeRunner, HttpCheckConfig, HttpChecker, ProbeConfig, LOCAL_ACCEPT,
    REMOTE_ACCEPT,
};

// =============================================================================
// Test Server
// =============================================================================

#[derive(Debug, Clone)]
struct CapturedRequest {
    method: String,
    path: String,
    accept: Option<String>,
    user_agent: Option<String>,
    body: Vec<u8>,
}

type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Serve a fixed response on an ephemeral port, recording every request.
async fn spawn_server(
    status: StatusCode,
    content_type: &'static str,
    payload: &'static str,
) -> (SocketAddr, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::default();
    let log = captured.clone();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let io = TokioIo::new(stream);
            let log = log.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let log = log.clone();
                    async move {
                        let (parts, body) = req.into_parts();
                        let bytes = body.collect().await?.to_bytes();
                        let header = |name: &str| {
                            parts
                                .headers
                                .get(name)
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string)
                        };

                        log.lock().push(CapturedRequest {
                            method: parts.method.to_string(),
                            path: parts.uri.path().to_string(),
                            accept: header("accept"),
                            user_agent: header("user-agent"),
                            body: bytes.to_vec(),
                        });

                        Ok::<_, hyper::Error>(
                            Response::builder()
                                .status(status)
                                .header("content-type", content_type)
                                .body(Full::new(Bytes::from_static(payload.as_bytes())))
                                .unwrap(),
                        )
                    }
                });

                let _ = http1::Builder::new().serve_connection(io, service).await;
            });
        }
    });

    (addr, captured)
}

fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn probe_config() -> ProbeConfig {
    ProbeConfig {
        test_name: "AvailabilityTestConsole".into(),
        location: "Boston, MA".into(),
        server_name: "probe-01".into(),
        ..Default::default()
    }
}

fn runner(sink: Arc<dyn ObservabilitySink>) -> AvailabilityProbeRunner {
    let http = HttpChecker::new(HttpCheckConfig {
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .unwrap();

    AvailabilityProbeRunner::new(probe_config(), Arc::new(http), sink)
}

const REPOS_JSON: &str = r#"[
    {"id": 1, "name": "runtime", "html_url": "https://example.com/acme/runtime"},
    {"id": 2, "name": "aspnetcore", "html_url": "https://example.com/acme/aspnetcore"}
]"#;

// =============================================================================
// HTTP Check Tests
// =============================================================================

mod http_checks {
    use super::*;

    #[tokio::test]
    async fn test_local_check_success() {
        let (addr, captured) = spawn_server(StatusCode::OK, "text/html", "<html>ok</html>").await;
        let url = format!("http://{}/", addr);
        let sink = Arc::new(InMemorySink::new());

        let record = runner(sink.clone())
            .run(ProbeTarget::LocalHttpCheck(url.clone()))
            .await;

        assert!(record.success);
        assert_eq!(record.message, "Availability test from Console");
        assert_eq!(record.property(TEST_URL_PROPERTY), Some(url.as_str()));
        assert_eq!(record.property(SERVER_PROPERTY), Some("probe-01"));
        assert!(sink.failure_records().is_empty());
        assert_eq!(sink.flush_count(), 1);

        let requests = captured.lock().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].accept.as_deref(), Some(LOCAL_ACCEPT));
        assert!(requests[0]
            .user_agent
            .as_deref()
            .unwrap_or_default()
            .starts_with("availprobe/"));
    }

    #[tokio::test]
    async fn test_server_error_status_is_still_success() {
        let (addr, _) =
            spawn_server(StatusCode::INTERNAL_SERVER_ERROR, "text/html", "<h1>oops</h1>").await;
        let sink = Arc::new(InMemorySink::new());

        let record = runner(sink.clone())
            .run(ProbeTarget::LocalHttpCheck(format!("http://{}/", addr)))
            .await;

        assert!(record.success);
        assert!(sink.failure_records().is_empty());
    }

    #[tokio::test]
    async fn test_remote_check_success() {
        let (addr, captured) = spawn_server(StatusCode::OK, "application/json", REPOS_JSON).await;
        let url = format!("http://{}/orgs/acme/repos", addr);
        let sink = Arc::new(InMemorySink::new());

        let record = runner(sink.clone())
            .run(ProbeTarget::RemoteHttpCheck(url.clone()))
            .await;

        assert!(record.success);
        assert_eq!(record.property(TEST_URL_PROPERTY), Some(url.as_str()));
        assert!(sink.failure_records().is_empty());

        let requests = captured.lock().clone();
        assert_eq!(requests[0].path, "/orgs/acme/repos");
        assert_eq!(requests[0].accept.as_deref(), Some(REMOTE_ACCEPT));
        assert!(requests[0].user_agent.is_some());
    }

    #[tokio::test]
    async fn test_remote_malformed_body_fails() {
        let (addr, _) = spawn_server(StatusCode::OK, "application/json", "{\"message\":1}").await;
        let url = format!("http://{}/", addr);
        let sink = Arc::new(InMemorySink::new());

        let record = runner(sink.clone())
            .run(ProbeTarget::RemoteHttpCheck(url.clone()))
            .await;

        assert!(!record.success);
        assert!(!record.message.is_empty());
        assert_eq!(record.property(TEST_URL_PROPERTY), Some(url.as_str()));

        let failures = sink.failure_records();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].correlation_id, record.id);
        assert_eq!(sink.flush_count(), 1);
    }

    #[tokio::test]
    async fn test_local_connection_refused() {
        let url = format!("http://{}/", closed_port());
        let sink = Arc::new(InMemorySink::new());

        let record = runner(sink.clone())
            .run(ProbeTarget::LocalHttpCheck(url))
            .await;

        assert!(!record.success);
        assert!(
            record.message.to_lowercase().contains("refused"),
            "unexpected message: {}",
            record.message
        );
        assert_eq!(record.property(TEST_URL_PROPERTY), None);

        let failures = sink.failure_records();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].correlation_id, record.id);
        assert_eq!(sink.availability_records().len(), 1);
        assert_eq!(sink.flush_count(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_makes_no_request() {
        let (_, captured) = spawn_server(StatusCode::OK, "text/html", "").await;
        let sink = Arc::new(InMemorySink::new());

        let record = runner(sink.clone()).run(ProbeTarget::Unconfigured).await;

        assert!(!record.success);
        assert_eq!(sink.failure_records().len(), 1);
        assert!(captured.lock().is_empty());
    }
}

// =============================================================================
// Telemetry Delivery Tests
// =============================================================================

mod telemetry_delivery {
    use super::*;

    fn ingestion(addr: SocketAddr) -> IngestionSink {
        IngestionSink::new(TelemetryConfig {
            instrumentation_key: "11111111-2222-3333-4444-555555555555".into(),
            endpoint: format!("http://{}/v2/track", addr),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_failed_run_delivers_both_records_in_one_flush() {
        let (addr, captured) =
            spawn_server(StatusCode::OK, "application/json", "{\"itemsAccepted\":2}").await;
        let ingestion = Arc::new(ingestion(addr));
        let memory = Arc::new(InMemorySink::new());
        let sink = CompositeSink::new()
            .with_shared(memory.clone())
            .with_shared(ingestion.clone());

        let record = runner(Arc::new(sink)).run(ProbeTarget::Unconfigured).await;

        assert!(!record.success);
        assert_eq!(ingestion.buffered(), 0);

        let requests = captured.lock().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/v2/track");

        let envelopes: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let envelopes = envelopes.as_array().unwrap();
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0]["data"]["baseType"], "ExceptionData");
        assert_eq!(envelopes[1]["data"]["baseType"], "AvailabilityData");
        assert_eq!(envelopes[0]["tags"]["ai.operation.id"], record.id.as_str());
        assert_eq!(envelopes[1]["tags"]["ai.operation.id"], record.id.as_str());
        assert_eq!(envelopes[1]["data"]["baseData"]["success"], false);
    }

    #[tokio::test]
    async fn test_rejected_flush_does_not_affect_run() {
        let (addr, captured) =
            spawn_server(StatusCode::BAD_REQUEST, "application/json", "{\"errors\":[]}").await;
        let ingestion = Arc::new(ingestion(addr));

        let record = runner(ingestion.clone()).run(ProbeTarget::Unconfigured).await;

        assert!(!record.success);
        assert_eq!(captured.lock().len(), 1);
        assert_eq!(ingestion.buffered(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_does_not_affect_run() {
        let ingestion = Arc::new(ingestion(closed_port()));
        let (addr, _) = spawn_server(StatusCode::OK, "text/html", "<html></html>").await;

        let record = runner(ingestion.clone())
            .run(ProbeTarget::LocalHttpCheck(format!("http://{}/", addr)))
            .await;

        assert!(record.success);
        assert_eq!(ingestion.buffered(), 0);
    }
}
