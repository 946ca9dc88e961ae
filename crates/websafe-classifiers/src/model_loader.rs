//! Candle-backed model oracle loaded from a safetensors artifact
//!
//! The artifact holds a linear softmax classifier over the 11 ordered
//! features:
//! - `classifier.weight`: `[num_classes, 11]`
//! - `classifier.bias`: `[num_classes]`

use crate::oracle::{Oracle, OracleLoader, OracleOutput};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Linear, Module};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use websafe_core::{Error, Result, FEATURE_COUNT};

/// Tensor name of the weight matrix
pub const WEIGHT_TENSOR: &str = "classifier.weight";

/// Tensor name of the bias vector
pub const BIAS_TENSOR: &str = "classifier.bias";

/// Source location for the model artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Load from local file system
    LocalPath(PathBuf),

    /// Download from Hugging Face Hub
    HuggingFace {
        repo_id: String,
        revision: Option<String>,
        filename: String,
    },
}

/// Device type for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// CPU inference (always available)
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize),
    /// Metal (Apple Silicon)
    Metal(usize),
}

/// Configuration for loading the model artifact
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub source: ModelSource,
    pub device: DeviceType,
}

impl ModelConfig {
    /// Create a new model configuration from local path
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ModelSource::LocalPath(path.into()),
            device: DeviceType::Cpu,
        }
    }

    /// Create a new model configuration from Hugging Face
    pub fn from_hf(repo_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            source: ModelSource::HuggingFace {
                repo_id: repo_id.into(),
                revision: None,
                filename: filename.into(),
            },
            device: DeviceType::Cpu,
        }
    }

    /// Set Hugging Face revision
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        if let ModelSource::HuggingFace { repo_id, filename, .. } = self.source {
            self.source = ModelSource::HuggingFace {
                repo_id,
                revision: Some(revision.into()),
                filename,
            };
        }
        self
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::from_local("phishing_model.safetensors")
    }
}

fn candle_error(context: &str) -> impl Fn(candle_core::Error) -> Error + '_ {
    move |e| Error::oracle(format!("{}: {}", context, e))
}

/// Linear softmax classifier evaluated with Candle
pub struct LinearSoftmaxModel {
    name: String,
    linear: Linear,
    device: Device,
    num_classes: usize,
}

impl LinearSoftmaxModel {
    /// Build from weight `[k, 11]` and bias `[k]` tensors
    pub fn from_tensors(name: impl Into<String>, weight: Tensor, bias: Tensor, device: Device) -> Result<Self> {
        let weight = weight
            .to_dtype(DType::F32)
            .map_err(candle_error("Failed to convert weights"))?;
        let bias = bias
            .to_dtype(DType::F32)
            .map_err(candle_error("Failed to convert bias"))?;

        let (num_classes, input_dim) = weight
            .dims2()
            .map_err(candle_error("Weight tensor must be 2-dimensional"))?;

        if input_dim != FEATURE_COUNT {
            return Err(Error::oracle(format!(
                "model expects {} features, vector has {}",
                input_dim, FEATURE_COUNT
            )));
        }

        // The score composer reads p[0] and p[1]
        if num_classes < 2 {
            return Err(Error::oracle(format!(
                "model must have at least 2 classes, found {}",
                num_classes
            )));
        }

        let bias_len = bias
            .dims1()
            .map_err(candle_error("Bias tensor must be 1-dimensional"))?;
        if bias_len != num_classes {
            return Err(Error::oracle(format!(
                "bias has {} entries for {} classes",
                bias_len, num_classes
            )));
        }

        Ok(Self {
            name: name.into(),
            linear: Linear::new(weight, Some(bias)),
            device,
            num_classes,
        })
    }

    /// Load from a safetensors file
    pub fn load(path: &Path, device: Device) -> Result<Self> {
        let mut tensors = candle_core::safetensors::load(path, &device)
            .map_err(candle_error("Failed to load SafeTensors"))?;

        let weight = tensors
            .remove(WEIGHT_TENSOR)
            .ok_or_else(|| Error::oracle(format!("artifact is missing tensor '{}'", WEIGHT_TENSOR)))?;
        let bias = tensors
            .remove(BIAS_TENSOR)
            .ok_or_else(|| Error::oracle(format!("artifact is missing tensor '{}'", BIAS_TENSOR)))?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self::from_tensors(name, weight, bias, device)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

impl Oracle for LinearSoftmaxModel {
    fn predict(&self, input: &[f32; FEATURE_COUNT]) -> Result<OracleOutput> {
        let input = Tensor::from_slice(input.as_slice(), (1, FEATURE_COUNT), &self.device)
            .map_err(candle_error("Failed to build input tensor"))?;

        let logits = self
            .linear
            .forward(&input)
            .map_err(candle_error("Forward pass failed"))?;

        let probabilities: Vec<f32> = candle_nn::ops::softmax(&logits, D::Minus1)
            .and_then(|p| p.squeeze(0))
            .and_then(|p| p.to_vec1())
            .map_err(candle_error("Softmax failed"))?;

        let output = OracleOutput::from_probabilities(probabilities.into_iter().map(f64::from).collect());
        debug!("Model '{}' output: {:?}", self.name, output);
        Ok(output)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Loads a [`LinearSoftmaxModel`] from its configured source
pub struct ModelArtifactLoader {
    config: ModelConfig,
}

impl ModelArtifactLoader {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Resolve model path from source
    fn resolve_model_path(&self) -> Result<PathBuf> {
        match &self.config.source {
            ModelSource::LocalPath(path) => {
                if !path.exists() {
                    return Err(Error::config(format!("Model file not found: {:?}", path)));
                }
                Ok(path.clone())
            }
            ModelSource::HuggingFace {
                repo_id,
                revision,
                filename,
            } => {
                let api = Api::new()
                    .map_err(|e| Error::config(format!("Failed to initialize HF API: {}", e)))?;

                let repo = api.repo(Repo::with_revision(
                    repo_id.clone(),
                    RepoType::Model,
                    revision.clone().unwrap_or_else(|| "main".to_string()),
                ));

                repo.get(filename)
                    .map_err(|e| Error::config(format!("Failed to download model from HF: {}", e)))
            }
        }
    }
}

impl OracleLoader for ModelArtifactLoader {
    fn load(&self) -> Result<Arc<dyn Oracle>> {
        let path = self.resolve_model_path()?;
        let device = create_device(self.config.device)?;
        let model = LinearSoftmaxModel::load(&path, device)?;
        Ok(Arc::new(model))
    }

    fn describe(&self) -> String {
        match &self.config.source {
            ModelSource::LocalPath(path) => path.display().to_string(),
            ModelSource::HuggingFace {
                repo_id, filename, ..
            } => format!("hf://{}/{}", repo_id, filename),
        }
    }
}

/// Create Candle device from device type
fn create_device(device_type: DeviceType) -> Result<Device> {
    match device_type {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda(idx) => Device::new_cuda(idx).map_err(candle_error("Failed to create CUDA device")),
        DeviceType::Metal(idx) => Device::new_metal(idx).map_err(candle_error("Failed to create Metal device")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensors(weights: &[f32], rows: usize, bias: &[f32]) -> (Tensor, Tensor) {
        let weight = Tensor::from_slice(weights, (rows, weights.len() / rows), &Device::Cpu).unwrap();
        let bias = Tensor::from_slice(bias, bias.len(), &Device::Cpu).unwrap();
        (weight, bias)
    }

    #[test]
    fn test_model_config_hf() {
        let config = ModelConfig::from_hf("websafe/url-risk", "model.safetensors").with_revision("v2");

        if let ModelSource::HuggingFace { repo_id, revision, filename } = &config.source {
            assert_eq!(repo_id, "websafe/url-risk");
            assert_eq!(revision.as_deref(), Some("v2"));
            assert_eq!(filename, "model.safetensors");
        } else {
            panic!("Expected HuggingFace source");
        }
    }

    #[test]
    fn test_bias_only_model_predicts_largest_bias() {
        let (weight, bias) = tensors(&[0.0; 4 * FEATURE_COUNT], 4, &[0.0, 3.0, 0.0, 0.0]);
        let model = LinearSoftmaxModel::from_tensors("bias-only", weight, bias, Device::Cpu).unwrap();

        let output = model.predict(&[1.0; FEATURE_COUNT]).unwrap();
        assert_eq!(output.class_id, 1);
        assert_eq!(output.probabilities.len(), 4);
        let total: f64 = output.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_wrong_input_width() {
        let (weight, bias) = tensors(&[0.0; 2 * 5], 2, &[0.0, 0.0]);
        assert!(LinearSoftmaxModel::from_tensors("narrow", weight, bias, Device::Cpu).is_err());
    }

    #[test]
    fn test_rejects_single_class() {
        let (weight, bias) = tensors(&[0.0; FEATURE_COUNT], 1, &[0.0]);
        assert!(LinearSoftmaxModel::from_tensors("single", weight, bias, Device::Cpu).is_err());
    }

    #[test]
    fn test_missing_local_artifact() {
        let loader = ModelArtifactLoader::new(ModelConfig::from_local("/nonexistent/model.safetensors"));
        let err = loader.load().err().unwrap();
        assert!(err.to_string().contains("Model file not found"));
    }
}
