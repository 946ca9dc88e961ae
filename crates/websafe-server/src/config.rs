//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use websafe_classifiers::{DetectorConfig, ModelSourceSpec};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL reported by `/` and `/health`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Detector settings
    #[serde(default)]
    pub detector: DetectorConfig,
}

/// Values from the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub base_url: Option<String>,
    pub model: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: impl AsRef<Path>, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let config_path = config_path.as_ref();

        // Try to load from file, or use defaults
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };

        config.apply(overrides);
        Ok(config)
    }

    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply CLI overrides
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(listen) = &overrides.listen {
            self.listen = listen.clone();
        }

        if let Some(port) = overrides.port {
            self.port = port;
        }

        if let Some(base_url) = &overrides.base_url {
            self.base_url = base_url.clone();
        }

        if let Some(model) = &overrides.model {
            self.detector.model.source = ModelSourceSpec::Local { path: model.clone() };
        }
    }

    /// Socket address string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            base_url: default_base_url(),
            cors_origins: Vec::new(),
            detector: DetectorConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}
