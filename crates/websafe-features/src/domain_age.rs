//! Domain age lookup
//!
//! `HashedDomainAge` is a stand-in: it derives a stable pseudo age from the
//! domain string and performs no WHOIS query. Swap in a real
//! [`DomainAgeSource`] without touching the extractor.

use sha2::{Digest, Sha256};
use websafe_core::Result;

/// Age reported when a lookup fails
pub const DEFAULT_DOMAIN_AGE_DAYS: u64 = 30;

/// Source of domain registration age in days
pub trait DomainAgeSource: Send + Sync {
    /// Age of `domain` in days
    fn domain_age_days(&self, domain: &str) -> Result<u64>;
}

/// Placeholder age source: `hash(domain) mod 365 + 30`
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedDomainAge;

impl DomainAgeSource for HashedDomainAge {
    fn domain_age_days(&self, domain: &str) -> Result<u64> {
        if domain.is_empty() {
            return Err(websafe_core::Error::extraction("empty domain"));
        }

        let digest = Sha256::digest(domain.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);

        Ok(u64::from_be_bytes(prefix) % 365 + DEFAULT_DOMAIN_AGE_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashed_age_in_range() {
        let source = HashedDomainAge;
        for domain in ["example.com", "a.b.c.example.org", "192.168.0.1", "x"] {
            let age = source.domain_age_days(domain).unwrap();
            assert!((30..395).contains(&age), "age {} out of range", age);
        }
    }

    #[test]
    fn test_hashed_age_is_stable() {
        let source = HashedDomainAge;
        assert_eq!(
            source.domain_age_days("example.com").unwrap(),
            source.domain_age_days("example.com").unwrap()
        );
    }

    #[test]
    fn test_empty_domain_fails() {
        assert!(HashedDomainAge.domain_age_days("").is_err());
    }
}
