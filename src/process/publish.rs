use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::blob::BlobStore;
use crate::error::PipelineError;
use crate::feed::GeneratedFeed;

/// Rendered document on local disk; removed when dropped.
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub async fn write(dir: &Path, body: &[u8]) -> Result<Self> {
        let path = dir.join(format!("rssfan-{}.xml", Uuid::new_v4().simple()));
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("stage {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Render, stage to a temporary file, then upload under `key`.
/// Returns the store's description of where the document landed.
pub async fn publish(blob: &dyn BlobStore, staging_dir: &Path, key: &str, doc: &GeneratedFeed) -> Result<String, PipelineError> {
    let xml = doc.render()?;
    tracing::debug!(key, xml = %String::from_utf8_lossy(&xml), "generated feed");
    let staged = StagedFile::write(staging_dir, &xml).await.map_err(PipelineError::Upload)?;
    blob.put_file(key, staged.path()).await.map_err(PipelineError::Upload)?;
    Ok(blob.describe(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn staged_file_is_removed_on_drop() {
        let staged = StagedFile::write(&std::env::temp_dir(), b"<rss/>").await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        drop(staged);
        assert!(!path.exists());
    }
}
