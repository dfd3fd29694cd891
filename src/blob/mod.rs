use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;

mod fs;
#[cfg(feature = "s3")]
mod s3;

pub use fs::FsBlobStore;
#[cfg(feature = "s3")]
pub use s3::S3BlobStore;

/// Object store for generated feed documents. Writes overwrite.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes) -> Result<()>;

    /// Upload a file that was staged on local disk.
    async fn put_file(&self, key: &str, path: &Path) -> Result<()> {
        let body = tokio::fs::read(path)
            .await
            .with_context(|| format!("read staged file {}", path.display()))?;
        self.put(key, Bytes::from(body)).await
    }

    /// Human-readable location, for logs.
    fn describe(&self, key: &str) -> String;
}
