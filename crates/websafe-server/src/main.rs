//! WebSafe Server
//!
//! Scores URLs for phishing and malware risk over HTTP.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

use websafe_server::{create_router, AppState, ConfigOverrides, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "websafe-server")]
#[command(about = "WebSafe URL phishing detection API", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Local model artifact (safetensors)
    #[arg(short, long, env = "WEBSAFE_MODEL")]
    model: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Public base URL reported by the API
    #[arg(short, long, env = "WEBSAFE_BASE_URL")]
    base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            listen: self.listen.clone(),
            port: self.port,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting WebSafe Detection API");

    let config = ServerConfig::load(&cli.config, &cli.overrides())?;
    info!("Configuration loaded successfully");
    info!("Base URL: {}", config.base_url);
    info!("Model: {:?}", config.detector.model.source);

    let metrics_handle = init_metrics()?;

    // A missing or unreadable model artifact is fatal here
    let addr: SocketAddr = config.bind_address().parse()?;
    let state = AppState::new(config, metrics_handle).await?;
    info!("Application state initialized successfully");

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("websafe=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("websafe=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Install the Prometheus recorder and describe the service metrics
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "websafe_requests_total",
        "Total number of API requests by endpoint"
    );
    metrics::describe_counter!(
        "websafe_predictions_total",
        "Total number of predictions by verdict"
    );
    metrics::describe_histogram!(
        "websafe_prediction_latency_us",
        metrics::Unit::Microseconds,
        "End-to-end prediction latency in microseconds"
    );
    metrics::describe_counter!(
        "websafe_probe_failures_total",
        "Network probe failures degraded to neutral values, by probe"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
