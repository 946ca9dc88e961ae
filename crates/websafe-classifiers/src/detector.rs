//! Phishing detector: extraction, oracle, score composition and evidence

use crate::composer::compose;
use crate::evidence;
use crate::oracle::OracleHandle;
use crate::thresholds::ThresholdTable;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use websafe_core::{validate_request_url, PredictionResult, Result};
use websafe_features::FeatureExtractor;

/// Default number of URLs scored concurrently by [`PhishingDetector::predict_batch`]
pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

/// Outcome for one entry of a batch request
#[derive(Debug, Clone, PartialEq)]
pub enum BatchItem {
    /// The URL passed validation and was scored; `url` is the normalized form
    Scored {
        url: String,
        result: PredictionResult,
    },

    /// The URL was rejected before scoring; `url` is the trimmed input
    Rejected { url: String, reason: String },
}

impl BatchItem {
    pub fn url(&self) -> &str {
        match self {
            Self::Scored { url, .. } | Self::Rejected { url, .. } => url,
        }
    }
}

/// Scores URLs against the model oracle and explains the result per feature
pub struct PhishingDetector {
    extractor: FeatureExtractor,
    oracle: OracleHandle,
    thresholds: ThresholdTable,
    batch_concurrency: usize,
}

impl PhishingDetector {
    pub fn new(extractor: FeatureExtractor, oracle: OracleHandle, thresholds: ThresholdTable) -> Self {
        Self {
            extractor,
            oracle,
            thresholds,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Build a detector with the HTTP prober and the configured model artifact
    #[cfg(feature = "ml-models")]
    pub fn from_config(config: &crate::config::DetectorConfig) -> Result<Self> {
        use crate::model_loader::ModelArtifactLoader;
        use std::sync::Arc;

        let extractor = FeatureExtractor::with_http_prober(config.probe.clone())?;
        let loader = ModelArtifactLoader::new(config.model.to_model_config());
        let thresholds = ThresholdTable::calibrated().with_overrides(&config.thresholds);

        Ok(Self::new(extractor, OracleHandle::lazy(Arc::new(loader)), thresholds)
            .with_batch_concurrency(config.batch_concurrency))
    }

    /// Set the batch concurrency limit (minimum 1)
    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    pub fn batch_concurrency(&self) -> usize {
        self.batch_concurrency
    }

    /// Whether the oracle is loaded
    pub fn is_ready(&self) -> bool {
        self.oracle.is_loaded()
    }

    /// Load the oracle now instead of on the first prediction
    pub async fn ensure_loaded(&self) -> Result<()> {
        self.oracle.get().await.map(|_| ())
    }

    /// Score a validated URL, surfacing oracle failures
    #[instrument(skip(self))]
    pub async fn try_predict(&self, url: &str) -> Result<PredictionResult> {
        let start = Instant::now();

        let features = self.extractor.extract(url).await;
        let oracle = self.oracle.get().await?;
        let output = oracle.predict(&features.to_model_input())?;
        let (verdict, score) = compose(output.class_id, &output.probabilities)?;

        let tiers = self.thresholds.classify_vector(&features);
        let evidence = evidence::build(&features, &tiers);

        metrics::counter!("websafe_predictions_total", "verdict" => verdict.as_str()).increment(1);
        metrics::histogram!("websafe_prediction_latency_us").record(start.elapsed().as_micros() as f64);

        debug!(verdict = verdict.as_str(), score, elapsed_us = start.elapsed().as_micros() as u64, "Prediction complete");
        Ok(PredictionResult::new(verdict, score, evidence))
    }

    /// Score a validated URL. Failures yield [`PredictionResult::error`].
    pub async fn predict(&self, url: &str) -> PredictionResult {
        match self.try_predict(url).await {
            Ok(result) => result,
            Err(e) => {
                error!("Prediction failed for {}: {}", url, e);
                metrics::counter!("websafe_predictions_total", "verdict" => "error").increment(1);
                PredictionResult::error()
            }
        }
    }

    /// Validate and score a batch of raw URLs.
    ///
    /// Entries are scored concurrently up to the batch concurrency limit.
    /// The output has one item per input, in input order.
    pub async fn predict_batch(&self, urls: Vec<String>) -> Vec<BatchItem> {
        info!("Scoring batch of {} URLs", urls.len());

        stream::iter(urls)
            .map(|raw| self.score_batch_entry(raw))
            .buffered(self.batch_concurrency)
            .collect()
            .await
    }

    async fn score_batch_entry(&self, raw: String) -> BatchItem {
        match validate_request_url(&raw) {
            Ok(url) => {
                let result = self.predict(&url).await;
                BatchItem::Scored { url, result }
            }
            Err(e) => {
                debug!("Rejected batch entry {:?}: {}", raw, e);
                BatchItem::Rejected {
                    url: raw.trim().to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl std::fmt::Debug for PhishingDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhishingDetector")
            .field("oracle", &self.oracle)
            .field("batch_concurrency", &self.batch_concurrency)
            .finish()
    }
}
