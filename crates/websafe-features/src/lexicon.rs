//! Suspicious-word lexicon matching

use aho_corasick::AhoCorasick;
use websafe_core::Result;

/// Words commonly used in phishing lures
pub const SUSPICIOUS_WORDS: [&str; 6] = ["login", "verify", "account", "suspended", "click", "urgent"];

/// Case-insensitive multi-word matcher using Aho-Corasick
pub struct SuspiciousWords {
    matcher: AhoCorasick,
    word_count: usize,
}

impl SuspiciousWords {
    /// Create a matcher over the given words
    pub fn new<I, P>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let words: Vec<String> = words.into_iter().map(|w| w.as_ref().to_string()).collect();

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&words)
            .map_err(|e| websafe_core::Error::extraction(format!("Failed to build lexicon matcher: {}", e)))?;

        Ok(Self {
            matcher,
            word_count: words.len(),
        })
    }

    /// Number of distinct lexicon words occurring in `text`.
    ///
    /// Repeated occurrences of the same word count once.
    pub fn count_distinct(&self, text: &str) -> u64 {
        let mut seen = vec![false; self.word_count];
        for m in self.matcher.find_overlapping_iter(text) {
            seen[m.pattern().as_usize()] = true;
        }
        seen.into_iter().filter(|hit| *hit).count() as u64
    }
}

impl Default for SuspiciousWords {
    fn default() -> Self {
        Self::new(SUSPICIOUS_WORDS).expect("Failed to build default lexicon")
    }
}
