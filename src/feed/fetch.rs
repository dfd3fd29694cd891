use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use url::Url;

/// Retrieves the raw bytes behind a work item's `source`.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &str) -> Result<Bytes>;
}

/// HTTP(S) URLs go through reqwest; `file://` URLs and bare paths are read
/// from the local filesystem.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rssfan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, source: &str) -> Result<Bytes> {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let resp = self.client.get(url).send().await?;
                let status = resp.status();
                if !status.is_success() { bail!("HTTP {} when fetching {}", status, source); }
                Ok(resp.bytes().await?)
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| anyhow::anyhow!("bad file url: {source}"))?;
                read_local(path).await
            }
            // bare paths, including Windows drive letters that parse as a scheme
            _ => read_local(PathBuf::from(source)).await,
        }
    }
}

async fn read_local(path: PathBuf) -> Result<Bytes> {
    let body = tokio::fs::read(&path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    Ok(Bytes::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_bare_paths_and_file_urls() {
        let path = std::env::temp_dir().join(format!("rssfan-fetch-{}.xml", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&path, b"<rss/>").await.unwrap();
        let fetcher = HttpFetcher::new(Duration::from_secs(1)).unwrap();

        let bare = fetcher.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(&bare[..], b"<rss/>");

        let url = Url::from_file_path(&path).unwrap();
        let via_url = fetcher.fetch(url.as_str()).await.unwrap();
        assert_eq!(&via_url[..], b"<rss/>");
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_path_is_an_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1)).unwrap();
        assert!(fetcher.fetch("/definitely/not/here.xml").await.is_err());
    }
}
