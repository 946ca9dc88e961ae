//! Latency benchmarks for the offline parts of a prediction
//!
//! Covers lexical extraction, threshold classification, evidence building
//! and a full prediction with a fixed oracle and no network.
//!
//! Run with: cargo bench -p websafe-classifiers

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

use websafe_classifiers::{evidence, Oracle, OracleHandle, OracleOutput, PhishingDetector, ThresholdTable};
use websafe_core::{Result, FEATURE_COUNT};
use websafe_features::{ContentProber, FeatureExtractor, HashedDomainAge, PageSignals};

const URLS: [(&str, &str); 4] = [
    ("short", "https://example.com"),
    ("login_path", "http://secure-login.example.com/account/verify?user=alice"),
    ("ip_host", "http://192.168.10.20/bank/update.php"),
    (
        "long_query",
        "https://a.b.c.d.example.co.uk/path/to/resource?session=0123456789abcdef0123456789abcdef&next=%2Flogin%2Fverify&ref=mail",
    ),
];

struct NoNetwork;

#[async_trait]
impl ContentProber for NoNetwork {
    async fn count_redirects(&self, _url: &str) -> Result<u32> {
        Ok(0)
    }

    async fn fetch_page_signals(&self, _url: &str) -> Result<PageSignals> {
        Ok(PageSignals::default())
    }
}

struct BenignOracle;

impl Oracle for BenignOracle {
    fn predict(&self, _input: &[f32; FEATURE_COUNT]) -> Result<OracleOutput> {
        Ok(OracleOutput::from_probabilities(vec![0.9, 0.05, 0.03, 0.02]))
    }

    fn name(&self) -> &str {
        "benign"
    }
}

fn extractor() -> FeatureExtractor {
    FeatureExtractor::new(Arc::new(NoNetwork), Arc::new(HashedDomainAge)).expect("Failed to create extractor")
}

fn benchmark_lexical_extraction(c: &mut Criterion) {
    let extractor = extractor();

    let mut group = c.benchmark_group("Lexical_Extraction");
    for (name, url) in URLS {
        group.bench_with_input(BenchmarkId::new("extract_lexical", name), &url, |b, url| {
            b.iter(|| extractor.extract_lexical(black_box(url)))
        });
    }
    group.finish();
}

fn benchmark_threshold_and_evidence(c: &mut Criterion) {
    let extractor = extractor();
    let table = ThresholdTable::calibrated();

    let mut group = c.benchmark_group("Threshold_Evidence");
    for (name, url) in URLS {
        let features = extractor.extract_lexical(url);

        group.bench_with_input(BenchmarkId::new("classify_vector", name), &features, |b, features| {
            b.iter(|| table.classify_vector(black_box(features)))
        });

        let tiers = table.classify_vector(&features);
        group.bench_with_input(BenchmarkId::new("build_evidence", name), &features, |b, features| {
            b.iter(|| evidence::build(black_box(features), &tiers))
        });
    }
    group.finish();
}

fn benchmark_prediction(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let detector = PhishingDetector::new(
        extractor(),
        OracleHandle::preloaded(Arc::new(BenignOracle)),
        ThresholdTable::calibrated(),
    );

    let mut group = c.benchmark_group("Prediction");
    group.sample_size(100);

    for (name, url) in URLS {
        group.bench_with_input(BenchmarkId::new("predict", name), &url, |b, url| {
            b.iter(|| rt.block_on(async { detector.predict(black_box(url)).await }))
        });
    }

    let batch: Vec<String> = URLS.iter().map(|(_, url)| url.to_string()).collect();
    group.bench_function("predict_batch_4", |b| {
        b.iter(|| rt.block_on(async { detector.predict_batch(black_box(batch.clone())).await }))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_lexical_extraction,
    benchmark_threshold_and_evidence,
    benchmark_prediction
);

criterion_main!(benches);
