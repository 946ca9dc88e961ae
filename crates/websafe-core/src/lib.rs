//! WebSafe Core
//!
//! Core types and utilities shared across WebSafe components.
//!
//! This crate provides:
//! - The fixed-order feature vector contract shared with the model oracle
//! - Severity tiers, verdicts, evidence items and prediction results
//! - Error types and result handling
//! - Request URL validation and normalization

pub mod error;
pub mod request;
pub mod types;

pub use error::{Error, Result};
pub use request::validate_request_url;
pub use types::{
    EvidenceItem, Feature, FeatureVector, PredictionResult, Tier, Verdict, FEATURE_COUNT,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{EvidenceItem, Feature, FeatureVector, PredictionResult, Tier, Verdict};
}
