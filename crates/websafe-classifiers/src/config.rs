//! Detector configuration: model artifact, probes, batching, threshold overrides

use crate::thresholds::TierRules;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use websafe_core::{Feature, Result};
use websafe_features::ProbeConfig;

/// Configuration for the phishing detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Model artifact specification
    #[serde(default)]
    pub model: ModelConfigSpec,

    /// Content prober settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Maximum URLs scored concurrently in a batch
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,

    /// Per-feature overrides of the calibrated threshold table
    #[serde(default)]
    pub thresholds: BTreeMap<Feature, TierRules>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model: ModelConfigSpec::default(),
            probe: ProbeConfig::default(),
            batch_concurrency: default_batch_concurrency(),
            thresholds: BTreeMap::new(),
        }
    }
}

impl DetectorConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| websafe_core::Error::config(format!("Invalid detector config: {}", e)))
    }
}

/// Model configuration specification (for YAML/config files)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfigSpec {
    /// Model source specification
    #[serde(flatten)]
    pub source: ModelSourceSpec,

    /// Device to run inference on
    #[serde(default)]
    pub device: DeviceSpec,
}

impl Default for ModelConfigSpec {
    fn default() -> Self {
        Self {
            source: ModelSourceSpec::Local {
                path: default_model_path(),
            },
            device: DeviceSpec::Cpu,
        }
    }
}

/// Model source specification (for config files)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelSourceSpec {
    /// Local file path
    Local { path: PathBuf },

    /// Hugging Face Hub
    HuggingFace {
        repo_id: String,
        filename: String,
        revision: Option<String>,
    },
}

/// Device specification (for config files)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSpec {
    #[default]
    Cpu,
    Cuda {
        index: Option<usize>,
    },
    Metal {
        index: Option<usize>,
    },
}

#[cfg(feature = "ml-models")]
impl ModelConfigSpec {
    /// Convert to ModelConfig for loading
    pub fn to_model_config(&self) -> crate::model_loader::ModelConfig {
        use crate::model_loader::{DeviceType, ModelConfig, ModelSource};

        let source = match &self.source {
            ModelSourceSpec::Local { path } => ModelSource::LocalPath(path.clone()),
            ModelSourceSpec::HuggingFace {
                repo_id,
                filename,
                revision,
            } => ModelSource::HuggingFace {
                repo_id: repo_id.clone(),
                revision: revision.clone(),
                filename: filename.clone(),
            },
        };

        let device = match self.device {
            DeviceSpec::Cpu => DeviceType::Cpu,
            DeviceSpec::Cuda { index } => DeviceType::Cuda(index.unwrap_or(0)),
            DeviceSpec::Metal { index } => DeviceType::Metal(index.unwrap_or(0)),
        };

        ModelConfig { source, device }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("phishing_model.safetensors")
}

fn default_batch_concurrency() -> usize {
    8
}
