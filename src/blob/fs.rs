use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use super::BlobStore;

/// Directory-backed store; the bucket is a root directory and keys are
/// relative paths under it.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

/// Keys become paths under the root, so they must name a file inside it.
fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() { bail!("blob key is empty"); }
    if key.starts_with('/') { bail!("blob key must not start with '/': {key}"); }
    if key.ends_with('/') { bail!("blob key must name a file, not a directory: {key}"); }
    if key.contains('\\') { bail!("blob key must not contain '\\': {key}"); }
    if key.split('/').any(|seg| seg == "..") { bail!("blob key must not contain '..' segments: {key}"); }
    Ok(())
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, body: Bytes) -> Result<()> {
        validate_key(key)?;
        let dest = self.path_for(key);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        // readers never observe a half-written document
        let tmp = dest.with_extension(format!("{}.partial", Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &dest)
            .await
            .with_context(|| format!("rename into {}", dest.display()))?;
        Ok(())
    }

    fn describe(&self, key: &str) -> String {
        self.path_for(key).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_creates_parents_and_overwrites() {
        let root = std::env::temp_dir().join(format!("rssfan-blob-{}", Uuid::new_v4().simple()));
        let store = FsBlobStore::new(&root);

        store.put("feed/tech", Bytes::from_static(b"one")).await.unwrap();
        store.put("feed/tech", Bytes::from_static(b"two")).await.unwrap();

        let body = tokio::fs::read(root.join("feed/tech")).await.unwrap();
        assert_eq!(body, b"two");
        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[test]
    fn keys_must_name_a_file_under_the_root() {
        assert!(validate_key("feed/tech").is_ok());
        assert!(validate_key("rss/MyFeed").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("feed/../../x").is_err());
        assert!(validate_key("feed\\tech").is_err());
        // empty channel title with no newfeedname
        assert!(validate_key("rss/").is_err());
    }

    #[tokio::test]
    async fn directory_key_fails_before_touching_disk() {
        let root = std::env::temp_dir().join(format!("rssfan-blob-{}", Uuid::new_v4().simple()));
        let store = FsBlobStore::new(&root);
        let err = store.put("rss/", Bytes::from_static(b"x")).await.unwrap_err();
        assert!(err.to_string().contains("not a directory"));
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn put_rejects_escaping_keys() {
        let store = FsBlobStore::new(std::env::temp_dir());
        assert!(store.put("../outside", Bytes::new()).await.is_err());
    }
}
