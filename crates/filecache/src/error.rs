use reqwest::StatusCode;

/// Error type for cache operations.
///
/// An in-flight download for the same key is deliberately *not* represented
/// here: a denied claim surfaces as [`Resolution::Remote`] from
/// [`CacheEngine::resolve`], never as an error.
///
/// [`Resolution::Remote`]: crate::engine::Resolution::Remote
/// [`CacheEngine::resolve`]: crate::engine::CacheEngine::resolve
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status code {0}")]
    Status(StatusCode),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
