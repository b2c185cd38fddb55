//! # filecache-engine
//!
//! A local, disk-backed cache of remotely fetched files, keyed by source
//! URL. Repeated requests for the same resource are served from local
//! storage instead of re-fetched over the network.
//!
//! ## Features
//!
//! - Deterministic URL-to-key derivation (keys double as filenames)
//! - At most one concurrent download per key, with a deterministic
//!   remote-URL fallback for callers that lose the claim
//! - TTL-based expiry via a background sweep, with an optional
//!   refresh-on-hit policy for hot entries
//! - Storage and transport injected behind narrow async capability traits,
//!   with `tokio::fs` and reqwest implementations included
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use filecache_engine::{CacheConfig, CacheEngine, DiskStorage, HttpFetcher, Resolution};
//!
//! # async fn run() -> Result<(), filecache_engine::CacheError> {
//! let engine = CacheEngine::new(
//!     CacheConfig::default().with_ttl(Duration::from_secs(1800)),
//!     Arc::new(DiskStorage::new()),
//!     Arc::new(HttpFetcher::new()?),
//! );
//! engine.start_sweeper(Duration::from_secs(5), Duration::from_secs(600));
//!
//! match engine.resolve("https://example.com/images/logo.png").await? {
//!     Resolution::Local(path) => println!("serving {}", path.display()),
//!     Resolution::Remote(url) => println!("download in progress, render {url}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod inflight;
pub mod key;
pub mod storage;
pub mod sweep;

pub use config::{CacheConfig, DEFAULT_TTL};
pub use engine::{CacheEngine, Resolution};
pub use error::CacheError;
pub use fetch::{Fetcher, HttpFetcher};
pub use inflight::{ClaimGuard, InFlightRegistry};
pub use key::CacheKey;
pub use storage::{DiskStorage, Storage};
pub use sweep::ExpirySweeper;
