//! Availprobe
//!
//! Console runner for a single synthetic availability test.
//!
//! # Flow
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌──────────────────┐
//! │    Prompt    │───▶│   Probe Runner   │───▶│ Observability    │
//! │  (1 / 2 / *) │    │  (HTTP checks)   │    │ Sink (+ flush)   │
//! └──────────────┘    └──────────────────┘    └──────────────────┘
//! ```

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use availprobe::adapters::{
    CompositeSink, IngestionSink, LoggingSink, TelemetryConfig, DEFAULT_ENDPOINT,
};
use availprobe::domain::{ObservabilitySink, ProbeTarget};
use availprobe::error::Result;
use availprobe::probe::{AvailabilityProbeRunner, HttpCheckConfig, HttpChecker, ProbeConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Availprobe - Run one availability test and report it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Instrumentation key of the telemetry resource (logging only when unset)
    #[arg(long, env = "APPINSIGHTS_INSTRUMENTATIONKEY")]
    instrumentation_key: Option<String>,

    /// Telemetry ingestion endpoint
    #[arg(long, env = "TELEMETRY_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    telemetry_endpoint: String,

    /// Test name reported with every record
    #[arg(long, env = "TEST_NAME", default_value = "AvailabilityTestConsole")]
    test_name: String,

    /// Run location label
    #[arg(long, env = "REGION_NAME", default_value = "local")]
    location: String,

    /// Server name reported on success
    #[arg(long, env = "SERVER_NAME", default_value = "localhost")]
    server_name: String,

    /// URL of the remote JSON API (scenario 1)
    #[arg(
        long,
        env = "REMOTE_URL",
        default_value = "https://api.github.com/orgs/dotnet/repos"
    )]
    remote_url: String,

    /// URL of the local HTML endpoint (scenario 2)
    #[arg(long, env = "LOCAL_URL", default_value = "http://localhost:5555/")]
    local_url: String,

    /// Timeout for each HTTP request in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value = "30")]
    request_timeout_seconds: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    println!("Hello Custom Availability Test!");

    info!("Starting availability test");
    info!("  Test name: {}", args.test_name);
    info!("  Location: {}", args.location);
    info!("  Telemetry endpoint: {}", args.telemetry_endpoint);

    let request_timeout = Duration::from_secs(args.request_timeout_seconds);

    let sink = build_sink(&args, request_timeout)?;

    let http = HttpChecker::new(HttpCheckConfig {
        request_timeout,
        ..Default::default()
    })?;

    let probe_config = ProbeConfig {
        test_name: args.test_name.clone(),
        location: args.location.clone(),
        server_name: args.server_name.clone(),
        ..Default::default()
    };

    let runner = AvailabilityProbeRunner::new(probe_config, Arc::new(http), sink);

    let target = prompt_target(&args.remote_url, &args.local_url).await;
    let record = runner.run(target).await;

    info!(
        "Availability test {} in {:?}: {}",
        if record.success { "passed" } else { "failed" },
        record.duration,
        record.message
    );

    Ok(())
}

// =============================================================================
// Scenario Prompt
// =============================================================================

async fn prompt_target(remote_url: &str, local_url: &str) -> ProbeTarget {
    println!("Enter: 1 for remote test, 2 for local test, other for unconfigured test");
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    let mut stdin = BufReader::new(tokio::io::stdin());

    if let Err(e) = stdin.read_line(&mut line).await {
        warn!("Failed to read selection: {}", e);
    }

    ProbeTarget::from_selection(&line, remote_url, local_url)
}

// =============================================================================
// Sink Setup
// =============================================================================

fn build_sink(args: &Args, request_timeout: Duration) -> Result<Arc<dyn ObservabilitySink>> {
    let key = args
        .instrumentation_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());

    match key {
        Some(key) => {
            let ingestion = IngestionSink::new(TelemetryConfig {
                instrumentation_key: key.to_string(),
                endpoint: args.telemetry_endpoint.clone(),
                request_timeout,
            })?;

            info!("Reporting to {}", args.telemetry_endpoint);

            Ok(Arc::new(
                CompositeSink::new()
                    .with_sink(LoggingSink::info_level())
                    .with_sink(ingestion),
            ))
        }
        None => {
            warn!("No instrumentation key configured - telemetry is logged only");
            Ok(Arc::new(LoggingSink::info_level()))
        }
    }
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=info".parse().unwrap());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
