//! Feature extraction: URL string to fixed-order feature vector

use crate::domain_age::{DomainAgeSource, HashedDomainAge, DEFAULT_DOMAIN_AGE_DAYS};
use crate::lexicon::{SuspiciousWords, SUSPICIOUS_WORDS};
use crate::prober::{probe_content, probe_redirects, ContentProber, HttpProber, ProbeConfig};
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;
use websafe_core::{Feature, FeatureVector, Result};

/// Scheme and domain of a URL as seen by the lexical features
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Lower-cased scheme, if any
    pub scheme: Option<String>,

    /// Lower-cased authority, or the path when there is no authority
    pub domain: String,
}

impl UrlParts {
    /// Split a URL into scheme and domain.
    ///
    /// The domain is the raw authority text, lower-cased, with userinfo and
    /// port kept (`user@host:8080`). Hosts are not normalized, so IDN labels
    /// and shorthand IPv4 forms reach the lexical features as written.
    pub fn parse(url: &str) -> Self {
        let mut parts = Self::split_raw(url);
        if let Ok(parsed) = Url::parse(url) {
            parts.scheme = Some(parsed.scheme().to_string());
        }
        parts
    }

    fn split_raw(url: &str) -> Self {
        let without_suffix = url.split(&['?', '#'][..]).next().unwrap_or_default();

        match without_suffix.split_once("://") {
            Some((scheme, rest)) => {
                let (authority, path) = match rest.find('/') {
                    Some(idx) => rest.split_at(idx),
                    None => (rest, ""),
                };
                let domain = if authority.is_empty() { path } else { authority };

                Self {
                    scheme: Some(scheme.to_lowercase()),
                    domain: domain.to_lowercase(),
                }
            }
            None => Self {
                scheme: None,
                domain: without_suffix.to_lowercase(),
            },
        }
    }

    /// Number of dot-separated labels beyond the registrable domain and TLD
    pub fn subdomain_count(&self) -> u64 {
        let labels = self.domain.matches('.').count() + 1;
        labels.saturating_sub(2) as u64
    }
}

/// Derives the 11 ordered features for a URL.
///
/// Extraction never fails: network and lookup errors are logged and replaced
/// by their neutral defaults.
pub struct FeatureExtractor {
    prober: Arc<dyn ContentProber>,
    domain_age: Arc<dyn DomainAgeSource>,
    lexicon: SuspiciousWords,
    ip_pattern: Regex,
}

impl FeatureExtractor {
    /// Create an extractor with injected collaborators
    pub fn new(prober: Arc<dyn ContentProber>, domain_age: Arc<dyn DomainAgeSource>) -> Result<Self> {
        Ok(Self {
            prober,
            domain_age,
            lexicon: SuspiciousWords::new(SUSPICIOUS_WORDS)?,
            ip_pattern: Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b")
                .map_err(|e| websafe_core::Error::extraction(format!("Failed to compile IP regex: {}", e)))?,
        })
    }

    /// Extractor using the HTTP prober and the placeholder domain-age source
    pub fn with_http_prober(config: ProbeConfig) -> Result<Self> {
        Self::new(Arc::new(HttpProber::new(config)?), Arc::new(HashedDomainAge))
    }

    /// Extract the full feature vector, probing the network
    pub async fn extract(&self, url: &str) -> FeatureVector {
        let mut features = self.extract_lexical(url);

        let prober = self.prober.as_ref();
        let (redirects, page) = tokio::join!(probe_redirects(prober, url), probe_content(prober, url));

        features.set(Feature::RedirectCount, u64::from(redirects));
        features.set_flag(Feature::HasLoginForm, page.has_login_form);
        features.set_flag(Feature::HasIframe, page.has_iframe);

        debug!("Features extracted for URL {}: {:?}", url, features);
        features
    }

    /// Features derivable without network access.
    ///
    /// Redirect and content features are left at 0.
    pub fn extract_lexical(&self, url: &str) -> FeatureVector {
        let parts = UrlParts::parse(url);
        let mut features = FeatureVector::zeroed();

        features.set(Feature::UrlLength, url.chars().count() as u64);
        features.set_flag(Feature::HasAtSymbol, url.contains('@'));
        features.set_flag(Feature::HasDash, parts.domain.contains('-'));
        features.set(Feature::SubdomainCount, parts.subdomain_count());
        features.set_flag(Feature::IsHttps, parts.scheme.as_deref() == Some("https"));
        features.set(Feature::DomainAgeDays, self.domain_age(&parts.domain));
        features.set_flag(Feature::HasIpAddress, self.ip_pattern.is_match(&parts.domain));
        features.set(Feature::SuspiciousWordsCount, self.lexicon.count_distinct(url));

        features
    }

    fn domain_age(&self, domain: &str) -> u64 {
        self.domain_age.domain_age_days(domain).unwrap_or_else(|e| {
            warn!("Failed to get domain age for {}: {}", domain, e);
            DEFAULT_DOMAIN_AGE_DAYS
        })
    }
}
