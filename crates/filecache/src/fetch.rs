//! # Fetch Capability
//!
//! The transport interface the engine drives, plus the default
//! implementation over a shared reqwest client. Transport stays separate
//! from persistence: a fetcher returns bytes and the engine materializes
//! them through [`Storage::write`], so single-writer discipline lives in one
//! place.
//!
//! [`Storage::write`]: crate::storage::Storage::write

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::Client;
use tracing::debug;

use crate::error::CacheError;

const DEFAULT_USER_AGENT: &str = concat!("filecache-engine/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport capability: download the bytes of a remote resource.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the resource at `url`, returning its full body.
    async fn fetch(&self, url: &str) -> Result<Bytes, CacheError>;
}

/// [`Fetcher`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default client configuration.
    pub fn new() -> Result<Self, CacheError> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    /// Create a fetcher around an existing client, for hosts that already
    /// maintain one with their own proxy or TLS settings.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, CacheError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Status(status));
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk?);
        }

        debug!(url, bytes = body.len(), "downloaded remote resource");
        Ok(body.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_builds() {
        assert!(HttpFetcher::new().is_ok());
    }
}
