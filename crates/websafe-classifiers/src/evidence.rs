//! Evidence builder: per-feature display labels and descriptions

use websafe_core::{EvidenceItem, Feature, FeatureVector, Tier, FEATURE_COUNT};

/// How a feature value is rendered as text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Description {
    /// Format string with a single `{}` replaced by the value
    Template(&'static str),

    /// Fixed text depending on whether the value is non-zero
    Flag {
        present: &'static str,
        absent: &'static str,
    },
}

impl Description {
    pub fn render(&self, value: u64) -> String {
        match *self {
            Self::Template(template) => template.replacen("{}", &value.to_string(), 1),
            Self::Flag { present, absent } => {
                if value != 0 {
                    present.to_string()
                } else {
                    absent.to_string()
                }
            }
        }
    }
}

/// Static display metadata for a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLabel {
    pub feature: Feature,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: Description,
}

impl FeatureLabel {
    /// Label for a feature
    pub fn of(feature: Feature) -> &'static FeatureLabel {
        &FEATURE_LABELS[feature.index()]
    }

    /// Evidence item for a value and its tier
    pub fn evidence(&self, value: u64, tier: Tier) -> EvidenceItem {
        EvidenceItem {
            name: self.name.to_string(),
            icon: self.icon.to_string(),
            tier,
            description: self.description.render(value),
        }
    }
}

/// Labels in canonical feature order
pub const FEATURE_LABELS: [FeatureLabel; FEATURE_COUNT] = [
    FeatureLabel {
        feature: Feature::UrlLength,
        name: "URL Length",
        icon: "📏",
        description: Description::Template("URL length ({} characters)"),
    },
    FeatureLabel {
        feature: Feature::HasAtSymbol,
        name: "At Symbol",
        icon: "❗",
        description: Description::Flag {
            present: "Contains @ symbol",
            absent: "No @ symbol",
        },
    },
    FeatureLabel {
        feature: Feature::HasDash,
        name: "Domain Dash",
        icon: "➖",
        description: Description::Flag {
            present: "Dash in domain",
            absent: "No dash in domain",
        },
    },
    FeatureLabel {
        feature: Feature::SubdomainCount,
        name: "Subdomains",
        icon: "🌐",
        description: Description::Template("{} subdomains"),
    },
    FeatureLabel {
        feature: Feature::IsHttps,
        name: "SSL Certificate",
        icon: "🔒",
        description: Description::Flag {
            present: "Valid SSL certificate",
            absent: "No SSL certificate",
        },
    },
    FeatureLabel {
        feature: Feature::DomainAgeDays,
        name: "Domain Age",
        icon: "📅",
        description: Description::Template("Domain age: {} days"),
    },
    FeatureLabel {
        feature: Feature::HasIpAddress,
        name: "IP Address",
        icon: "🌍",
        description: Description::Flag {
            present: "Uses IP address",
            absent: "Uses domain name",
        },
    },
    FeatureLabel {
        feature: Feature::RedirectCount,
        name: "Redirects",
        icon: "🔄",
        description: Description::Template("{} redirects"),
    },
    FeatureLabel {
        feature: Feature::HasLoginForm,
        name: "Login Form",
        icon: "🔑",
        description: Description::Flag {
            present: "Contains login form",
            absent: "No login form",
        },
    },
    FeatureLabel {
        feature: Feature::HasIframe,
        name: "Iframe",
        icon: "🖼️",
        description: Description::Flag {
            present: "Contains iframe",
            absent: "No iframe",
        },
    },
    FeatureLabel {
        feature: Feature::SuspiciousWordsCount,
        name: "Suspicious Words",
        icon: "🚨",
        description: Description::Template("{} suspicious words"),
    },
];

/// Build one evidence item per feature, in canonical order
pub fn build(features: &FeatureVector, tiers: &[Tier; FEATURE_COUNT]) -> Vec<EvidenceItem> {
    features
        .iter()
        .map(|(feature, value)| FeatureLabel::of(feature).evidence(value, tiers[feature.index()]))
        .collect()
}
