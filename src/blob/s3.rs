use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::BlobStore;

#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Credentials and region come from the default AWS provider chain.
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self { client: Client::new(&shared), bucket: bucket.into() }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/rss+xml")
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("s3 put s3://{}/{}", self.bucket, key))?;
        Ok(())
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .with_context(|| format!("open staged file {}", path.display()))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/rss+xml")
            .body(body)
            .send()
            .await
            .with_context(|| format!("s3 upload s3://{}/{}", self.bucket, key))?;
        Ok(())
    }

    fn describe(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}
