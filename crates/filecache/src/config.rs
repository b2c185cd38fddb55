//! Cache configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Sub-directory under the system temp dir used when no cache root is
/// configured, so we never collide with unrelated cache consumers.
const CACHE_SUBDIR: &str = "filecache";

/// Default maximum entry age before eviction.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Configuration for the cache engine.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Maximum entry age before the sweeper evicts it.
    pub ttl: Duration,
    /// Directory holding cached files. `None` selects the system temp dir
    /// plus a dedicated sub-folder.
    pub cache_dir: Option<PathBuf>,
    /// Whether a cache hit bumps the entry's freshness timestamp, shielding
    /// frequently-read entries from TTL eviction.
    pub refresh_on_hit: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_TTL,
            cache_dir: None,
            refresh_on_hit: false,
        }
    }
}

impl CacheConfig {
    /// Enable or disable caching.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the eviction TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the cache root directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the refresh-on-hit policy.
    pub fn with_refresh_on_hit(mut self, refresh: bool) -> Self {
        self.refresh_on_hit = refresh;
        self
    }

    pub(crate) fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(CACHE_SUBDIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert!(config.cache_dir.is_none());
        assert!(!config.refresh_on_hit);
    }

    #[test]
    fn default_cache_dir_is_scoped_subfolder() {
        let dir = CacheConfig::default().resolved_cache_dir();
        assert_eq!(dir, std::env::temp_dir().join("filecache"));
    }

    #[test]
    fn builder_style_setters() {
        let config = CacheConfig::default()
            .with_enabled(false)
            .with_ttl(Duration::from_secs(60))
            .with_cache_dir("/tmp/elsewhere")
            .with_refresh_on_hit(true);

        assert!(!config.enabled);
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.resolved_cache_dir(), PathBuf::from("/tmp/elsewhere"));
        assert!(config.refresh_on_hit);
    }
}
