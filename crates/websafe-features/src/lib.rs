//! WebSafe Features
//!
//! Turns a URL into the fixed-order feature vector consumed by the model
//! oracle and the threshold classifier.
//!
//! Features come from three sources:
//! - Lexical analysis of the URL string (length, symbols, domain shape, lexicon)
//! - A domain-age source (placeholder hash-based lookup by default)
//! - Network probes (redirect hops, login forms and iframes in the page)
//!
//! Network and lookup failures never surface: they degrade to neutral values.

pub mod domain_age;
pub mod extractor;
pub mod lexicon;
pub mod prober;

pub use domain_age::{DomainAgeSource, HashedDomainAge, DEFAULT_DOMAIN_AGE_DAYS};
pub use extractor::{FeatureExtractor, UrlParts};
pub use lexicon::{SuspiciousWords, SUSPICIOUS_WORDS};
pub use prober::{
    probe_content, probe_redirects, ContentProber, HttpProber, MarkupScanner, PageSignals,
    ProbeConfig,
};
