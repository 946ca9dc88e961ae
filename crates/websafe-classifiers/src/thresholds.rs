//! Threshold classifier: per-feature predicate tables mapping values to tiers
//!
//! Each feature has one predicate per tier. Tiers are tried in the fixed order
//! malware, danger, warning, safe; the first satisfied predicate wins and a
//! value matching nothing is safe. The tables are plain data and can be
//! overridden from configuration.
//!
//! The calibrated breakpoints come from an offline calibration step and are
//! treated as fixed configuration. `has_at_symbol`, `domain_age_days` and
//! `has_iframe` never leave the safe tier under the calibrated table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use websafe_core::{Feature, FeatureVector, Tier, FEATURE_COUNT};

/// Numeric comparison against a feature value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Never satisfied
    Never,
    /// Always satisfied
    Always,
    /// `v == x`
    Eq(f64),
    /// `v <= x`
    Le(f64),
    /// `v < x`
    Lt(f64),
    /// `v > x`
    Gt(f64),
    /// `v >= x`
    Ge(f64),
    /// `above < v <= up_to`
    Between { above: f64, up_to: f64 },
}

impl Predicate {
    /// Whether `value` satisfies this predicate
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Self::Never => false,
            Self::Always => true,
            Self::Eq(x) => value == x,
            Self::Le(x) => value <= x,
            Self::Lt(x) => value < x,
            Self::Gt(x) => value > x,
            Self::Ge(x) => value >= x,
            Self::Between { above, up_to } => above < value && value <= up_to,
        }
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::Never
    }
}

/// One predicate per tier for a single feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRules {
    #[serde(default)]
    pub safe: Predicate,

    #[serde(default)]
    pub warning: Predicate,

    #[serde(default)]
    pub danger: Predicate,

    #[serde(default)]
    pub malware: Predicate,
}

impl TierRules {
    /// Rules that classify every value as safe
    pub const ALWAYS_SAFE: TierRules = TierRules {
        safe: Predicate::Always,
        warning: Predicate::Never,
        danger: Predicate::Never,
        malware: Predicate::Never,
    };

    /// Predicate for a tier
    pub fn predicate(&self, tier: Tier) -> Predicate {
        match tier {
            Tier::Safe => self.safe,
            Tier::Warning => self.warning,
            Tier::Danger => self.danger,
            Tier::Malware => self.malware,
        }
    }

    /// Tier for `value`: first match in evaluation order, default safe
    pub fn classify(&self, value: f64) -> Tier {
        Tier::EVALUATION_ORDER
            .into_iter()
            .find(|tier| self.predicate(*tier).matches(value))
            .unwrap_or(Tier::Safe)
    }
}

impl Default for TierRules {
    fn default() -> Self {
        Self::ALWAYS_SAFE
    }
}

/// Predicate tables keyed by feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    rules: BTreeMap<Feature, TierRules>,
}

impl ThresholdTable {
    /// The calibrated table
    pub fn calibrated() -> Self {
        use Predicate::*;

        let rule = |safe, warning, danger, malware| TierRules {
            safe,
            warning,
            danger,
            malware,
        };

        let rules = BTreeMap::from([
            (
                Feature::UrlLength,
                rule(
                    Le(118.710_526_315_789_48),
                    Between {
                        above: 118.710_526_315_789_48,
                        up_to: 133.605_263_157_894_74,
                    },
                    Between {
                        above: 133.605_263_157_894_74,
                        up_to: 163.394_736_842_105_26,
                    },
                    Gt(163.394_736_842_105_26),
                ),
            ),
            (Feature::HasAtSymbol, TierRules::ALWAYS_SAFE),
            (Feature::HasDash, rule(Le(0.0), Never, Gt(0.0), Never)),
            (
                Feature::SubdomainCount,
                rule(Le(1.0), Between { above: 1.0, up_to: 4.0 }, Gt(4.0), Never),
            ),
            (Feature::IsHttps, rule(Eq(1.0), Never, Eq(0.0), Never)),
            (Feature::DomainAgeDays, TierRules::ALWAYS_SAFE),
            (Feature::HasIpAddress, rule(Eq(0.0), Never, Eq(1.0), Never)),
            (
                Feature::RedirectCount,
                rule(Le(1.0), Between { above: 1.0, up_to: 2.0 }, Gt(2.0), Never),
            ),
            (Feature::HasLoginForm, rule(Le(0.0), Never, Gt(0.0), Never)),
            (Feature::HasIframe, rule(Ge(0.0), Never, Never, Never)),
            (Feature::SuspiciousWordsCount, rule(Le(2.0), Never, Gt(2.0), Never)),
        ]);

        Self { rules }
    }

    /// Replace the rules of individual features
    pub fn with_overrides(mut self, overrides: &BTreeMap<Feature, TierRules>) -> Self {
        for (feature, rules) in overrides {
            self.rules.insert(*feature, *rules);
        }
        self
    }

    /// Rules for a feature; features without rules are always safe
    pub fn rules(&self, feature: Feature) -> TierRules {
        self.rules.get(&feature).copied().unwrap_or(TierRules::ALWAYS_SAFE)
    }

    /// Classify a single feature value
    pub fn classify(&self, feature: Feature, value: f64) -> Tier {
        self.rules(feature).classify(value)
    }

    /// Classify a feature by its snake-case name
    pub fn classify_named(&self, name: &str, value: f64) -> Option<Tier> {
        Feature::from_name(name).map(|feature| self.classify(feature, value))
    }

    /// Classify every entry of a vector, in canonical order
    pub fn classify_vector(&self, features: &FeatureVector) -> [Tier; FEATURE_COUNT] {
        let mut tiers = [Tier::Safe; FEATURE_COUNT];
        for (feature, value) in features.iter() {
            tiers[feature.index()] = self.classify(feature, value as f64);
        }
        tiers
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::calibrated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_length_tiers() {
        let table = ThresholdTable::calibrated();
        assert_eq!(table.classify(Feature::UrlLength, 100.0), Tier::Safe);
        assert_eq!(table.classify(Feature::UrlLength, 125.0), Tier::Warning);
        assert_eq!(table.classify(Feature::UrlLength, 150.0), Tier::Danger);
        assert_eq!(table.classify(Feature::UrlLength, 200.0), Tier::Malware);
    }

    #[test]
    fn test_url_length_breakpoints() {
        let table = ThresholdTable::calibrated();
        assert_eq!(table.classify(Feature::UrlLength, 118.0), Tier::Safe);
        assert_eq!(table.classify(Feature::UrlLength, 119.0), Tier::Warning);
        assert_eq!(table.classify(Feature::UrlLength, 133.0), Tier::Warning);
        assert_eq!(table.classify(Feature::UrlLength, 134.0), Tier::Danger);
        assert_eq!(table.classify(Feature::UrlLength, 163.0), Tier::Danger);
        assert_eq!(table.classify(Feature::UrlLength, 164.0), Tier::Malware);
    }

    #[test]
    fn test_binary_features() {
        let table = ThresholdTable::calibrated();
        assert_eq!(table.classify(Feature::HasDash, 0.0), Tier::Safe);
        assert_eq!(table.classify(Feature::HasDash, 1.0), Tier::Danger);
        assert_eq!(table.classify(Feature::IsHttps, 1.0), Tier::Safe);
        assert_eq!(table.classify(Feature::IsHttps, 0.0), Tier::Danger);
        assert_eq!(table.classify(Feature::HasIpAddress, 0.0), Tier::Safe);
        assert_eq!(table.classify(Feature::HasIpAddress, 1.0), Tier::Danger);
        assert_eq!(table.classify(Feature::HasLoginForm, 0.0), Tier::Safe);
        assert_eq!(table.classify(Feature::HasLoginForm, 1.0), Tier::Danger);
    }

    #[test]
    fn test_count_features() {
        let table = ThresholdTable::calibrated();
        assert_eq!(table.classify(Feature::SubdomainCount, 1.0), Tier::Safe);
        assert_eq!(table.classify(Feature::SubdomainCount, 3.0), Tier::Warning);
        assert_eq!(table.classify(Feature::SubdomainCount, 5.0), Tier::Danger);
        assert_eq!(table.classify(Feature::RedirectCount, 1.0), Tier::Safe);
        assert_eq!(table.classify(Feature::RedirectCount, 2.0), Tier::Warning);
        assert_eq!(table.classify(Feature::RedirectCount, 3.0), Tier::Danger);
        assert_eq!(table.classify(Feature::SuspiciousWordsCount, 2.0), Tier::Safe);
        assert_eq!(table.classify(Feature::SuspiciousWordsCount, 3.0), Tier::Danger);
    }

    #[test]
    fn test_features_that_never_leave_safe() {
        let table = ThresholdTable::calibrated();
        for value in [0.0, 1.0, 30.0, 394.0, 10_000.0] {
            assert_eq!(table.classify(Feature::HasAtSymbol, value), Tier::Safe);
            assert_eq!(table.classify(Feature::DomainAgeDays, value), Tier::Safe);
            assert_eq!(table.classify(Feature::HasIframe, value), Tier::Safe);
        }
    }

    #[test]
    fn test_first_match_wins_in_severity_order() {
        // Overlapping predicates: malware must win over danger and warning
        let rules = TierRules {
            safe: Predicate::Always,
            warning: Predicate::Always,
            danger: Predicate::Ge(5.0),
            malware: Predicate::Ge(10.0),
        };
        assert_eq!(rules.classify(12.0), Tier::Malware);
        assert_eq!(rules.classify(7.0), Tier::Danger);
        assert_eq!(rules.classify(1.0), Tier::Warning);
    }

    #[test]
    fn test_no_match_defaults_to_safe() {
        let rules = TierRules {
            safe: Predicate::Never,
            warning: Predicate::Eq(3.0),
            danger: Predicate::Never,
            malware: Predicate::Never,
        };
        assert_eq!(rules.classify(9.0), Tier::Safe);
    }

    #[test]
    fn test_classify_named() {
        let table = ThresholdTable::calibrated();
        assert_eq!(table.classify_named("url_length", 200.0), Some(Tier::Malware));
        assert_eq!(table.classify_named("bogus", 1.0), None);
    }

    #[test]
    fn test_overrides_from_yaml() {
        let yaml = r#"
has_iframe:
  safe:
    le: 0
  danger:
    gt: 0
"#;
        let overrides: BTreeMap<Feature, TierRules> = serde_yaml::from_str(yaml).unwrap();
        let table = ThresholdTable::calibrated().with_overrides(&overrides);

        assert_eq!(table.classify(Feature::HasIframe, 1.0), Tier::Danger);
        assert_eq!(table.classify(Feature::HasIframe, 0.0), Tier::Safe);
        assert_eq!(table.classify(Feature::UrlLength, 200.0), Tier::Malware);
    }
}
