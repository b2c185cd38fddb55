//! # In-Flight Registry
//!
//! Tracks which cache keys currently have a download in progress and
//! enforces at-most-one-concurrent-fetch-per-key. Claiming and membership
//! testing happen under a single mutex, so no two callers can both observe a
//! key as absent. Different keys proceed fully in parallel.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::key::CacheKey;

/// Set of cache keys with a download in flight.
///
/// Clones share the same underlying set; one engine holds exactly one
/// authoritative registry.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    keys: Arc<Mutex<HashSet<CacheKey>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim `key` for a download.
    ///
    /// Returns `None` when a download for the key is already in flight. The
    /// returned guard releases the claim when dropped, so every exit path of
    /// the fetch it protects gives the key back exactly once.
    pub fn try_claim(&self, key: &CacheKey) -> Option<ClaimGuard> {
        let mut keys = self.keys.lock();
        if keys.insert(key.clone()) {
            Some(ClaimGuard {
                registry: self.clone(),
                key: key.clone(),
            })
        } else {
            None
        }
    }

    /// Whether a download for `key` is currently in flight.
    pub fn is_inflight(&self, key: &CacheKey) -> bool {
        self.keys.lock().contains(key)
    }

    /// Number of downloads currently in flight.
    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, key: &CacheKey) {
        self.keys.lock().remove(key);
    }
}

/// Exclusive right to download one key, released on drop.
#[derive(Debug)]
pub struct ClaimGuard {
    registry: InFlightRegistry,
    key: CacheKey,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(url: &str) -> CacheKey {
        CacheKey::derive(url)
    }

    #[test]
    fn claim_then_deny_then_release() {
        let registry = InFlightRegistry::new();
        let k = key("https://example.com/a.png");

        let guard = registry.try_claim(&k).expect("first claim succeeds");
        assert!(registry.is_inflight(&k));
        assert!(registry.try_claim(&k).is_none(), "second claim is denied");

        drop(guard);
        assert!(!registry.is_inflight(&k));
        assert!(registry.try_claim(&k).is_some(), "claimable again after release");
    }

    #[test]
    fn distinct_keys_claim_independently() {
        let registry = InFlightRegistry::new();
        let a = key("https://example.com/a.png");
        let b = key("https://example.com/b.png");

        let _ga = registry.try_claim(&a).unwrap();
        let _gb = registry.try_claim(&b).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn clones_share_one_set() {
        let registry = InFlightRegistry::new();
        let clone = registry.clone();
        let k = key("https://example.com/a.png");

        let guard = registry.try_claim(&k).unwrap();
        assert!(clone.try_claim(&k).is_none());

        drop(guard);
        assert!(clone.is_empty());
    }

    #[test]
    fn guard_releases_even_when_holder_panics() {
        let registry = InFlightRegistry::new();
        let k = key("https://example.com/a.png");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe({
            let registry = registry.clone();
            let k = k.clone();
            move || {
                let _guard = registry.try_claim(&k).unwrap();
                panic!("fetch blew up");
            }
        }));

        assert!(result.is_err());
        assert!(!registry.is_inflight(&k), "claim released by unwinding");
    }

    #[test]
    fn concurrent_claims_admit_exactly_one() {
        let registry = InFlightRegistry::new();
        let k = key("https://example.com/contended.png");
        let barrier = Arc::new(std::sync::Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                let k = k.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    let claim = registry.try_claim(&k);
                    // Hold any claim until every thread has attempted.
                    barrier.wait();
                    claim.is_some()
                })
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1, "exactly one thread may win the claim");
    }
}
