//! # Cache Keys
//!
//! Deterministic mapping from a source URL to a filename-safe cache key.
//! The same algorithm backs every operation that names an entry on disk
//! (hit test, write, delete, sweep), so a key derived once is valid
//! everywhere.

use std::fmt;

use sha2::{Digest, Sha256};

/// Identifier for a cached resource, derived from its source URL.
///
/// Rendered as the lowercase hex SHA-256 of the URL string, which doubles as
/// the entry's filename under the cache root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a source URL.
    ///
    /// Total over any input string and free of external state: the same URL
    /// always yields the same key.
    pub fn derive(url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let hash = hasher.finalize();
        Self(hex::encode(hash))
    }

    /// The key as a filename-safe string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn derivation_is_deterministic() {
        let url = "https://example.com/images/logo.png";
        assert_eq!(CacheKey::derive(url), CacheKey::derive(url));
        assert_eq!(CacheKey::derive(url).as_str(), CacheKey::derive(url).as_str());
    }

    #[test]
    fn distinct_urls_yield_distinct_keys() {
        let corpus = [
            "https://example.com/a.png",
            "https://example.com/b.png",
            "https://example.com/a.png?v=2",
            "https://example.com/a.png#frag",
            "http://example.com/a.png",
            "https://example.org/a.png",
            "https://example.com/A.png",
            "ftp://example.com/a.png",
            "https://example.com/nested/a.png",
            "https://example.com/",
        ];

        let keys: HashSet<CacheKey> = corpus.iter().map(|u| CacheKey::derive(u)).collect();
        assert_eq!(keys.len(), corpus.len(), "no collisions expected in corpus");
    }

    #[test]
    fn keys_are_filename_safe_hex() {
        let key = CacheKey::derive("https://example.com/with spaces/ünïcode?q=a&b=c");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key.as_str(), key.as_str().to_lowercase());
    }

    #[test]
    fn derivation_handles_awkward_inputs() {
        // Must never panic, whatever the caller hands us.
        let _ = CacheKey::derive("");
        let _ = CacheKey::derive("not a url at all");
        let _ = CacheKey::derive("\0\n\t");
        let _ = CacheKey::derive(&"x".repeat(10_000));
    }

    #[test]
    fn display_matches_as_str() {
        let key = CacheKey::derive("https://example.com/a.png");
        assert_eq!(key.to_string(), key.as_str());
    }
}
