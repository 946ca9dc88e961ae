//! Tests for loading the model oracle from a safetensors artifact
//!
//! The artifacts are written to a temp directory, so no download is needed.

#![cfg(feature = "ml-models")]

use candle_core::{Device, Tensor};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use websafe_classifiers::model_loader::{BIAS_TENSOR, WEIGHT_TENSOR};
use websafe_classifiers::{
    ModelArtifactLoader, ModelConfig, OracleHandle, OracleLoader, PhishingDetector, ThresholdTable,
};
use websafe_core::{Feature, Verdict, FEATURE_COUNT};
use websafe_features::{FeatureExtractor, HashedDomainAge};

mod support {
    use async_trait::async_trait;
    use websafe_core::Result;
    use websafe_features::{ContentProber, PageSignals};

    pub struct NoNetwork;

    #[async_trait]
    impl ContentProber for NoNetwork {
        async fn count_redirects(&self, _url: &str) -> Result<u32> {
            Ok(0)
        }

        async fn fetch_page_signals(&self, _url: &str) -> Result<PageSignals> {
            Ok(PageSignals::default())
        }
    }
}

/// Four-class model: HTTPS pushes towards legitimate, everything else phishing
fn write_artifact(path: &Path) {
    let mut weights = vec![0f32; 4 * FEATURE_COUNT];
    weights[Feature::IsHttps.index()] = 6.0;
    let bias = [0.0f32, 3.0, 0.0, 0.0];

    let tensors = HashMap::from([
        (
            WEIGHT_TENSOR.to_string(),
            Tensor::from_slice(&weights, (4, FEATURE_COUNT), &Device::Cpu).unwrap(),
        ),
        (
            BIAS_TENSOR.to_string(),
            Tensor::from_slice(&bias, 4, &Device::Cpu).unwrap(),
        ),
    ]);

    candle_core::safetensors::save(&tensors, path).unwrap();
}

fn detector_for(path: &Path) -> PhishingDetector {
    let extractor = FeatureExtractor::new(Arc::new(support::NoNetwork), Arc::new(HashedDomainAge)).unwrap();
    let loader = ModelArtifactLoader::new(ModelConfig::from_local(path));
    PhishingDetector::new(extractor, OracleHandle::lazy(Arc::new(loader)), ThresholdTable::calibrated())
}

#[test]
fn test_load_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("url_model.safetensors");
    write_artifact(&path);

    let loader = ModelArtifactLoader::new(ModelConfig::from_local(&path));
    let oracle = loader.load().unwrap();
    assert_eq!(oracle.name(), "url_model");

    let mut input = [0f32; FEATURE_COUNT];
    input[Feature::IsHttps.index()] = 1.0;
    let output = oracle.predict(&input).unwrap();
    assert_eq!(output.class_id, 0);
    assert_eq!(output.probabilities.len(), 4);
}

#[tokio::test]
async fn test_detector_with_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("url_model.safetensors");
    write_artifact(&path);

    let detector = detector_for(&path);
    detector.ensure_loaded().await.unwrap();
    assert!(detector.is_ready());

    let secure = detector.predict("https://example.com").await;
    assert_eq!(secure.verdict, Verdict::Legitimate);
    assert!(secure.score > 9.0);
    assert_eq!(secure.evidence.len(), FEATURE_COUNT);

    let plain = detector.predict("http://example.com").await;
    assert_eq!(plain.verdict, Verdict::Phishing);
    assert!(plain.score < 2.0);
}

#[tokio::test]
async fn test_missing_artifact_fails_startup_load() {
    let dir = tempfile::tempdir().unwrap();
    let detector = detector_for(&dir.path().join("absent.safetensors"));

    let err = detector.ensure_loaded().await.unwrap_err();
    assert!(err.to_string().contains("Model file not found"));
    assert!(detector.predict("https://example.com").await.is_error());
}

#[tokio::test]
async fn test_artifact_missing_bias_tensor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.safetensors");

    let weights = vec![0f32; 2 * FEATURE_COUNT];
    let tensors = HashMap::from([(
        WEIGHT_TENSOR.to_string(),
        Tensor::from_slice(&weights, (2, FEATURE_COUNT), &Device::Cpu).unwrap(),
    )]);
    candle_core::safetensors::save(&tensors, &path).unwrap();

    let err = detector_for(&path).ensure_loaded().await.unwrap_err();
    assert!(err.is_oracle());
    assert!(err.to_string().contains(BIAS_TENSOR));
}
