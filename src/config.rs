use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::blob::{BlobStore, FsBlobStore};

const MAX_PAGE_SIZE: i64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobBackend {
    Fs,
    S3,
}

/// Collaborator references, resolved once at start-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub catalog: String,
    pub dispatch_queue: String,
    pub channel_queue: String,
    pub blob_backend: BlobBackend,
    pub blob_bucket: String,
    pub fetch_timeout: Duration,
    pub page_size: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| get(k).filter(|v| !v.trim().is_empty());

        let dispatch_queue = var("RSSFAN_DISPATCH_QUEUE").unwrap_or_else(|| "channels".to_string());
        let channel_queue = var("RSSFAN_CHANNEL_QUEUE").unwrap_or_else(|| dispatch_queue.clone());

        let blob_backend = match var("RSSFAN_BLOB_BACKEND").as_deref() {
            None | Some("fs") => BlobBackend::Fs,
            Some("s3") => BlobBackend::S3,
            Some(other) => bail!("RSSFAN_BLOB_BACKEND must be fs or s3, got {other:?}"),
        };

        let fetch_timeout = match var("RSSFAN_FETCH_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(v.parse().with_context(|| format!("RSSFAN_FETCH_TIMEOUT_SECS={v}"))?),
            None => Duration::from_secs(20),
        };
        let page_size = match var("RSSFAN_PAGE_SIZE") {
            Some(v) => v.parse::<i64>().with_context(|| format!("RSSFAN_PAGE_SIZE={v}"))?,
            None => 100,
        };
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            bail!("RSSFAN_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}, got {page_size}");
        }

        Ok(AppConfig {
            catalog: var("RSSFAN_CATALOG").unwrap_or_else(|| "default".to_string()),
            dispatch_queue,
            channel_queue,
            blob_backend,
            blob_bucket: var("RSSFAN_BLOB_BUCKET").unwrap_or_else(|| "./published".to_string()),
            fetch_timeout,
            page_size,
        })
    }

    pub async fn blob_store(&self) -> Result<Arc<dyn BlobStore>> {
        match self.blob_backend {
            BlobBackend::Fs => Ok(Arc::new(FsBlobStore::new(&self.blob_bucket))),
            #[cfg(feature = "s3")]
            BlobBackend::S3 => Ok(Arc::new(crate::blob::S3BlobStore::from_env(self.blob_bucket.clone()).await)),
            #[cfg(not(feature = "s3"))]
            BlobBackend::S3 => bail!("RSSFAN_BLOB_BACKEND=s3 requires building with --features s3"),
        }
    }
}
