//! Model oracle contract and load-once handle

use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};
use websafe_core::{Result, FEATURE_COUNT};

/// Output of one oracle invocation
#[derive(Debug, Clone, PartialEq)]
pub struct OracleOutput {
    /// Predicted class id
    pub class_id: i64,

    /// Probabilities aligned to class ids `0..k`
    pub probabilities: Vec<f64>,
}

impl OracleOutput {
    /// Output predicting the most probable class
    pub fn from_probabilities(probabilities: Vec<f64>) -> Self {
        let class_id = probabilities
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
                Some((_, best_p)) if best_p >= *p => best,
                _ => Some((i, *p)),
            })
            .map(|(i, _)| i as i64)
            .unwrap_or(-1);

        Self {
            class_id,
            probabilities,
        }
    }
}

/// Opaque trained classification model.
///
/// Implementations must be safe to invoke concurrently.
pub trait Oracle: Send + Sync {
    /// Classify one ordered feature vector
    fn predict(&self, input: &[f32; FEATURE_COUNT]) -> Result<OracleOutput>;

    /// Model name for logging
    fn name(&self) -> &str;
}

/// Loads an oracle from its artifact. Called at most once per successful load.
pub trait OracleLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Oracle>>;

    /// Human-readable artifact description
    fn describe(&self) -> String;
}

/// Lazily loaded, shared oracle.
///
/// The first caller triggers the load on a blocking thread; concurrent callers
/// wait for that same load. A failed load leaves the handle empty so a later
/// call can retry.
pub struct OracleHandle {
    loader: Option<Arc<dyn OracleLoader>>,
    cell: OnceCell<Arc<dyn Oracle>>,
}

impl OracleHandle {
    /// Handle that loads through `loader` on first use
    pub fn lazy(loader: Arc<dyn OracleLoader>) -> Self {
        Self {
            loader: Some(loader),
            cell: OnceCell::new(),
        }
    }

    /// Handle around an already loaded oracle
    pub fn preloaded(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            loader: None,
            cell: OnceCell::new_with(Some(oracle)),
        }
    }

    /// Whether the oracle has been loaded
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Get the oracle, loading it on first use
    pub async fn get(&self) -> Result<Arc<dyn Oracle>> {
        let oracle = self
            .cell
            .get_or_try_init(|| async {
                let loader = self
                    .loader
                    .clone()
                    .ok_or_else(|| websafe_core::Error::oracle("no oracle loader configured"))?;

                let description = loader.describe();
                info!("Loading model oracle from {}", description);

                let oracle = tokio::task::spawn_blocking(move || loader.load())
                    .await
                    .map_err(|e| websafe_core::Error::internal(format!("oracle load task failed: {}", e)))?
                    .map_err(|e| {
                        error!("Failed to load model oracle from {}: {}", description, e);
                        e
                    })?;

                info!("Model oracle '{}' loaded successfully", oracle.name());
                Ok::<_, websafe_core::Error>(oracle)
            })
            .await?;

        Ok(Arc::clone(oracle))
    }
}

impl fmt::Debug for OracleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleHandle")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
