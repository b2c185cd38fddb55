//! # Storage Capability
//!
//! The filesystem interface the engine drives, plus the default
//! implementation over `tokio::fs`. Paths are split into a directory and an
//! entry name so implementations can scope themselves to a cache root.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::warn;

/// Filesystem capability consumed by the cache engine.
///
/// All operations are asynchronous and may fail with an I/O error; the
/// engine decides per call site whether a failure propagates or degrades to
/// a cache miss.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Check whether an entry exists.
    async fn exists(&self, dir: &Path, name: &str) -> io::Result<bool>;

    /// Last modification time of an entry.
    async fn modified_at(&self, dir: &Path, name: &str) -> io::Result<SystemTime>;

    /// Write an entry, replacing any previous content.
    async fn write(&self, dir: &Path, name: &str, data: Bytes) -> io::Result<()>;

    /// Bump an entry's modification time to now.
    async fn touch(&self, dir: &Path, name: &str) -> io::Result<()>;

    /// Remove an entry. Removing a missing entry is not an error.
    async fn remove_file(&self, dir: &Path, name: &str) -> io::Result<()>;

    /// Remove a directory and everything under it.
    async fn remove_dir_all(&self, dir: &Path) -> io::Result<()>;

    /// Create a directory, including missing parents.
    async fn create_dir_all(&self, dir: &Path) -> io::Result<()>;

    /// List entry names and modification times under a directory.
    async fn list_entries(&self, dir: &Path) -> io::Result<Vec<(String, SystemTime)>>;
}

/// [`Storage`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStorage;

impl DiskStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Storage for DiskStorage {
    async fn exists(&self, dir: &Path, name: &str) -> io::Result<bool> {
        fs::try_exists(dir.join(name)).await
    }

    async fn modified_at(&self, dir: &Path, name: &str) -> io::Result<SystemTime> {
        fs::metadata(dir.join(name)).await?.modified()
    }

    async fn write(&self, dir: &Path, name: &str, data: Bytes) -> io::Result<()> {
        let final_path = dir.join(name);
        let temp_path = final_path.with_extension("tmp");

        // Write to a temporary file first, then rename into place, so a
        // concurrent reader never observes a half-written entry.
        fs::write(&temp_path, &data).await?;
        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            warn!(from = ?temp_path, to = ?final_path, error = %e, "failed to rename temporary cache file");
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        Ok(())
    }

    async fn touch(&self, dir: &Path, name: &str) -> io::Result<()> {
        let path = dir.join(name);
        tokio::task::spawn_blocking(move || {
            let file = std::fs::File::options().write(true).open(&path)?;
            file.set_modified(SystemTime::now())
        })
        .await
        .map_err(io::Error::other)?
    }

    async fn remove_file(&self, dir: &Path, name: &str) -> io::Result<()> {
        match fs::remove_file(dir.join(name)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    async fn remove_dir_all(&self, dir: &Path) -> io::Result<()> {
        match fs::remove_dir_all(dir).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    async fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir).await
    }

    async fn list_entries(&self, dir: &Path) -> io::Result<Vec<(String, SystemTime)>> {
        let mut out = Vec::new();
        let mut entries = fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => out.push((name, modified)),
                Err(e) => {
                    warn!(path = ?entry.path(), error = %e, "skipping cache entry with unreadable metadata");
                }
            }
        }

        Ok(out)
    }
}
