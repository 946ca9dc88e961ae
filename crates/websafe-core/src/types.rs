//! Core types for WebSafe

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Number of entries in every feature vector
pub const FEATURE_COUNT: usize = 11;

/// A named numeric signal derived from a URL or its fetched content.
///
/// The declaration order is the positional contract with the model oracle and
/// must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    UrlLength,
    HasAtSymbol,
    HasDash,
    SubdomainCount,
    IsHttps,
    DomainAgeDays,
    HasIpAddress,
    RedirectCount,
    HasLoginForm,
    HasIframe,
    SuspiciousWordsCount,
}

impl Feature {
    /// All features in canonical order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::UrlLength,
        Feature::HasAtSymbol,
        Feature::HasDash,
        Feature::SubdomainCount,
        Feature::IsHttps,
        Feature::DomainAgeDays,
        Feature::HasIpAddress,
        Feature::RedirectCount,
        Feature::HasLoginForm,
        Feature::HasIframe,
        Feature::SuspiciousWordsCount,
    ];

    /// Position of this feature in the vector
    pub fn index(self) -> usize {
        self as usize
    }

    /// Snake-case feature name
    pub fn name(self) -> &'static str {
        match self {
            Self::UrlLength => "url_length",
            Self::HasAtSymbol => "has_at_symbol",
            Self::HasDash => "has_dash",
            Self::SubdomainCount => "subdomain_count",
            Self::IsHttps => "is_https",
            Self::DomainAgeDays => "domain_age_days",
            Self::HasIpAddress => "has_ip_address",
            Self::RedirectCount => "redirect_count",
            Self::HasLoginForm => "has_login_form",
            Self::HasIframe => "has_iframe",
            Self::SuspiciousWordsCount => "suspicious_words_count",
        }
    }

    /// Look up a feature by its snake-case name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-length ordered vector of feature values.
///
/// Every slot always holds a value; a feature that could not be derived is 0
/// (or its documented neutral default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureVector {
    values: [u64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create a vector with every feature set to 0
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Get the value of a feature
    pub fn get(&self, feature: Feature) -> u64 {
        self.values[feature.index()]
    }

    /// Set the value of a feature
    pub fn set(&mut self, feature: Feature, value: u64) {
        self.values[feature.index()] = value;
    }

    /// Set a 0/1 feature from a boolean
    pub fn set_flag(&mut self, feature: Feature, present: bool) {
        self.set(feature, u64::from(present));
    }

    /// Raw values in canonical order
    pub fn values(&self) -> &[u64; FEATURE_COUNT] {
        &self.values
    }

    /// Number of entries (always `FEATURE_COUNT`)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate `(feature, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, u64)> + '_ {
        Feature::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Values as the numeric input expected by the model oracle
    pub fn to_model_input(&self) -> [f32; FEATURE_COUNT] {
        self.values.map(|v| v as f32)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.name(), &value)?;
        }
        map.end()
    }
}

/// Ordered severity classification of a single feature value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Safe,
    Warning,
    Danger,
    Malware,
}

impl Tier {
    /// Order in which tier predicates are evaluated; first match wins
    pub const EVALUATION_ORDER: [Tier; 4] = [Tier::Malware, Tier::Danger, Tier::Warning, Tier::Safe];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Malware => "malware",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final categorical label derived from the oracle's predicted class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Legitimate,
    Phishing,
    Defacement,
    Malware,
    Unknown,
    /// The prediction itself failed
    Error,
}

impl Verdict {
    /// Map an oracle class id to a verdict
    pub fn from_class(class_id: i64) -> Self {
        match class_id {
            0 => Self::Legitimate,
            1 => Self::Phishing,
            2 => Self::Defacement,
            3 => Self::Malware,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legitimate => "legitimate",
            Self::Phishing => "phishing",
            Self::Defacement => "defacement",
            Self::Malware => "malware",
            Self::Unknown => "unknown",
            Self::Error => "error",
        }
    }

    pub fn is_legitimate(self) -> bool {
        self == Self::Legitimate
    }

    /// User-facing summary message
    pub fn message(self) -> String {
        if self.is_legitimate() {
            "This website is safe.".to_string()
        } else {
            format!("Warning: This website may be a {} attempt!", self.as_str())
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable justification for one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Display name of the feature
    pub name: String,

    /// Icon glyph shown next to the name
    pub icon: String,

    /// Severity tier of the feature value
    pub tier: Tier,

    /// Value-dependent description
    pub description: String,
}

/// Terminal output of one scoring operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Verdict label
    pub verdict: Verdict,

    /// Safety score in [0, 10], higher is safer
    pub score: f64,

    /// Evidence in canonical feature order
    pub evidence: Vec<EvidenceItem>,
}

impl PredictionResult {
    /// Create a new prediction result
    pub fn new(verdict: Verdict, score: f64, evidence: Vec<EvidenceItem>) -> Self {
        Self {
            verdict,
            score,
            evidence,
        }
    }

    /// Result returned when the oracle fails
    pub fn error() -> Self {
        Self::new(Verdict::Error, 0.0, Vec::new())
    }

    pub fn is_error(&self) -> bool {
        self.verdict == Verdict::Error
    }
}
