//! WebSafe Classifiers
//!
//! Turns an extracted feature vector into a scored, explained prediction.
//!
//! The detector combines two independent views of a URL:
//! - The model oracle (a trained classifier) decides the verdict and the
//!   probabilities behind the 0-10 safety score
//! - The threshold tables classify each feature into a severity tier for the
//!   per-feature evidence shown to the user
//!
//! The oracle is loaded once per process, on first use or at startup via
//! [`PhishingDetector::ensure_loaded`]. With the `ml-models` feature the
//! oracle is a Candle linear softmax model read from a safetensors artifact.

pub mod composer;
pub mod config;
pub mod detector;
pub mod evidence;
#[cfg(feature = "ml-models")]
pub mod model_loader;
pub mod oracle;
pub mod thresholds;

pub use composer::{compose, MAX_SCORE};
pub use config::{DetectorConfig, DeviceSpec, ModelConfigSpec, ModelSourceSpec};
pub use detector::{BatchItem, PhishingDetector, DEFAULT_BATCH_CONCURRENCY};
pub use evidence::{Description, FeatureLabel, FEATURE_LABELS};
#[cfg(feature = "ml-models")]
pub use model_loader::{DeviceType, LinearSoftmaxModel, ModelArtifactLoader, ModelConfig, ModelSource};
pub use oracle::{Oracle, OracleHandle, OracleLoader, OracleOutput};
pub use thresholds::{Predicate, ThresholdTable, TierRules};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::detector::{BatchItem, PhishingDetector};
    pub use crate::oracle::{Oracle, OracleHandle, OracleLoader, OracleOutput};
    pub use crate::thresholds::ThresholdTable;
}
