//! Shared application state

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;
use websafe_classifiers::PhishingDetector;

use crate::config::ServerConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Detector with its loaded oracle
    pub detector: Arc<PhishingDetector>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Build the detector from configuration and load its oracle.
    ///
    /// Fails when the model artifact cannot be loaded.
    pub async fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        info!("Initializing application state");

        let detector = PhishingDetector::from_config(&config.detector)?;
        detector.ensure_loaded().await?;
        info!(
            "Detector ready (batch concurrency {})",
            detector.batch_concurrency()
        );

        Ok(Self::with_detector(config, detector, metrics_handle))
    }

    /// Wrap an already constructed detector
    pub fn with_detector(config: ServerConfig, detector: PhishingDetector, metrics_handle: PrometheusHandle) -> Self {
        Self {
            config: Arc::new(config),
            detector: Arc::new(detector),
            metrics_handle,
        }
    }
}
