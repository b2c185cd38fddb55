//! # Cache Engine
//!
//! Orchestrates URL resolution over the injected storage and fetch
//! capabilities: hit/miss decisions, single-flight download coordination,
//! and cache-wide operations (pre-warming, deletion, clearing, runtime
//! enable/TTL switches).

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::fetch::Fetcher;
use crate::inflight::InFlightRegistry;
use crate::key::CacheKey;
use crate::storage::Storage;
use crate::sweep::ExpirySweeper;

/// Outcome of a [`CacheEngine::resolve`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The resource is materialized locally at this path.
    Local(PathBuf),
    /// No local copy could be served; use the original remote URL. Returned
    /// when caching is disabled or when another download for the same key is
    /// already in flight.
    Remote(String),
}

impl Resolution {
    /// Whether the resource resolved to a local file.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Flatten into a renderable URI string: local path or remote URL.
    /// Wrapping it for framework-safe rendering is the host's job.
    pub fn into_uri(self) -> String {
        match self {
            Self::Local(path) => path.to_string_lossy().into_owned(),
            Self::Remote(url) => url,
        }
    }
}

struct EngineState {
    enabled: AtomicBool,
    ttl: RwLock<Duration>,
    refresh_on_hit: bool,
    cache_dir: PathBuf,
    initialized: AtomicBool,
}

/// Coordinates hit/miss decisions, downloads and cache-wide operations.
///
/// Cloning is cheap; every clone shares the same in-flight set and
/// configuration state. Storage and fetcher are injected capabilities whose
/// lifecycle the engine does not manage.
#[derive(Clone)]
pub struct CacheEngine {
    storage: Arc<dyn Storage>,
    fetcher: Arc<dyn Fetcher>,
    inflight: InFlightRegistry,
    state: Arc<EngineState>,
}

impl CacheEngine {
    /// Create an engine with the given configuration and capabilities.
    pub fn new(config: CacheConfig, storage: Arc<dyn Storage>, fetcher: Arc<dyn Fetcher>) -> Self {
        let cache_dir = config.resolved_cache_dir();

        Self {
            storage,
            fetcher,
            inflight: InFlightRegistry::new(),
            state: Arc::new(EngineState {
                enabled: AtomicBool::new(config.enabled),
                ttl: RwLock::new(config.ttl),
                refresh_on_hit: config.refresh_on_hit,
                cache_dir,
                initialized: AtomicBool::new(false),
            }),
        }
    }

    /// Resolve a URL to a local cached file, fetching it on a miss.
    ///
    /// On a hit no network call is made. On a miss the engine claims the key,
    /// downloads, persists and returns the local path; if another download
    /// for the same key is already in flight the original URL is returned as
    /// a fallback instead (callers wanting the materialized file re-resolve
    /// later). Fetch and persist errors propagate after the claim is
    /// released.
    pub async fn resolve(&self, url: &str) -> Result<Resolution, CacheError> {
        if !self.is_enabled() {
            return Ok(Resolution::Remote(url.to_owned()));
        }

        let key = CacheKey::derive(url);
        let dir = &self.state.cache_dir;

        // Read-path storage failures degrade to a miss instead of failing
        // the resolution.
        match self.storage.exists(dir, key.as_str()).await {
            Ok(true) => {
                if self.state.refresh_on_hit {
                    // Best effort: a failed touch never fails the hit.
                    if let Err(e) = self.storage.touch(dir, key.as_str()).await {
                        warn!(%key, error = %e, "failed to refresh cache entry timestamp");
                    }
                }
                debug!(url, %key, "cache hit");
                return Ok(Resolution::Local(dir.join(key.as_str())));
            }
            Ok(false) => {}
            Err(e) => {
                warn!(%key, error = %e, "cache existence check failed, treating as miss");
            }
        }

        let Some(_claim) = self.inflight.try_claim(&key) else {
            debug!(url, %key, "download already in flight, returning remote URL");
            return Ok(Resolution::Remote(url.to_owned()));
        };

        let path = self.fetch_and_store(url, &key).await?;
        Ok(Resolution::Local(path))
    }

    /// Pre-warm the cache with the given URLs, best effort.
    ///
    /// Each URL runs as an independent detached task; failures are logged
    /// and never surfaced, and one URL's failure does not abort the others.
    /// No-op while disabled.
    pub fn cache_many<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.is_enabled() {
            return;
        }

        for url in urls {
            let url = url.into();
            let engine = self.clone();
            tokio::spawn(async move {
                if let Err(e) = engine.resolve(&url).await {
                    warn!(url = %url, error = %e, "background cache fill failed");
                }
            });
        }
    }

    /// Delete the cached entry for a URL. Idempotent: deleting a URL that
    /// was never cached succeeds. No-op while disabled.
    pub async fn delete_one(&self, url: &str) -> Result<(), CacheError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let key = CacheKey::derive(url);
        self.storage
            .remove_file(&self.state.cache_dir, key.as_str())
            .await?;
        debug!(url, %key, "deleted cache entry");
        Ok(())
    }

    /// Delete every cached file and recreate the cache root so subsequent
    /// operations have a valid target. No-op while disabled.
    pub async fn clear_all(&self) -> Result<(), CacheError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let dir = &self.state.cache_dir;
        self.storage.remove_dir_all(dir).await?;
        self.storage.create_dir_all(dir).await?;
        self.state.initialized.store(true, Ordering::Release);
        debug!(dir = ?dir, "cleared cache");
        Ok(())
    }

    /// Enable or disable the cache at runtime.
    ///
    /// While disabled, `resolve` short-circuits to the original URL and all
    /// mutating operations become no-ops. A download already in flight
    /// completes normally and releases its claim.
    pub fn set_enabled(&self, enabled: bool) {
        self.state.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::Acquire)
    }

    /// Update the TTL consulted by the expiry sweeper. Takes effect on the
    /// next sweep cycle.
    pub fn set_ttl(&self, ttl: Duration) {
        *self.state.ttl.write() = ttl;
    }

    pub fn ttl(&self) -> Duration {
        *self.state.ttl.read()
    }

    /// The cache root directory.
    pub fn cache_dir(&self) -> &Path {
        &self.state.cache_dir
    }

    /// Canonical on-disk location for a URL's entry, whether or not it is
    /// currently cached.
    pub fn local_path_for(&self, url: &str) -> PathBuf {
        self.state.cache_dir.join(CacheKey::derive(url).as_str())
    }

    /// Spawn the background expiry sweeper for this engine.
    pub fn start_sweeper(&self, initial_delay: Duration, interval: Duration) -> JoinHandle<()> {
        ExpirySweeper::new(self.clone()).spawn(initial_delay, interval)
    }

    pub(crate) fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    async fn fetch_and_store(&self, url: &str, key: &CacheKey) -> Result<PathBuf, CacheError> {
        self.ensure_cache_dir().await?;
        let data = self.fetcher.fetch(url).await?;
        self.storage
            .write(&self.state.cache_dir, key.as_str(), data)
            .await?;
        debug!(url, %key, "cached remote resource");
        Ok(self.state.cache_dir.join(key.as_str()))
    }

    async fn ensure_cache_dir(&self) -> io::Result<()> {
        if self.state.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        // create_dir_all is idempotent, so racing initializers are harmless.
        self.storage.create_dir_all(&self.state.cache_dir).await?;
        self.state.initialized.store(true, Ordering::Release);
        Ok(())
    }
}
