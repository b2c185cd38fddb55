//! # Expiry Sweep
//!
//! Background eviction of cache entries older than the engine's TTL. A
//! sweep that cannot run is logged and skipped; it must never take the host
//! application down, and it holds no lock that blocks concurrent
//! resolution. Evicted entries are simply fetched again on their next
//! resolve.

use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::CacheEngine;

/// Periodic TTL eviction over the engine's cache root.
#[derive(Clone)]
pub struct ExpirySweeper {
    engine: CacheEngine,
}

impl ExpirySweeper {
    pub fn new(engine: CacheEngine) -> Self {
        Self { engine }
    }

    /// Run a single eviction pass.
    ///
    /// Reads the TTL at the start of the pass, so a `set_ttl` takes effect
    /// on the next sweep. Skips the cycle entirely while the cache is
    /// disabled. All failures are swallowed.
    pub async fn run_once(&self) {
        if !self.engine.is_enabled() {
            return;
        }

        let ttl = self.engine.ttl();
        let dir = self.engine.cache_dir();

        let entries = match self.engine.storage().list_entries(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = ?dir, error = %e, "cache sweep skipped, directory unreadable");
                return;
            }
        };

        let now = SystemTime::now();
        let mut evicted = 0usize;
        for (name, modified) in entries {
            let age = match now.duration_since(modified) {
                Ok(age) => age,
                // Entry mtime is in the future (clock adjustment); leave it.
                Err(_) => continue,
            };

            if age >= ttl {
                match self.engine.storage().remove_file(dir, &name).await {
                    Ok(()) => evicted += 1,
                    Err(e) => warn!(name = %name, error = %e, "failed to evict expired cache entry"),
                }
            }
        }

        if evicted > 0 {
            debug!(evicted, "cache sweep evicted expired entries");
        }
    }

    /// Spawn a detached task that sweeps once after `initial_delay`, then on
    /// every `interval` tick.
    pub fn spawn(self, initial_delay: Duration, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(initial_delay).await;
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.run_once().await;
            }
        })
    }
}
