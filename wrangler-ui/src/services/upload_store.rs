//! Uploaded rework sources
//!
//! Uploads are written to a single directory and indexed in memory by upload
//! id. Like jobs, entries live until the process exits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Extension used when the client filename has none
pub const DEFAULT_UPLOAD_EXTENSION: &str = ".wav";

/// One stored upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRecord {
    pub path: PathBuf,
    pub filename: Option<String>,
}

/// Upload directory plus in-memory index
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    uploads: Arc<RwLock<HashMap<String, UploadRecord>>>,
}

impl UploadStore {
    /// Use `dir` for uploads, creating it if missing
    pub fn new(dir: PathBuf) -> std::io::Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            uploads: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Fresh `wrangler-uploads-<id>` directory under the system temp dir
    pub fn in_temp_dir() -> std::io::Result<Self> {
        let dir = std::env::temp_dir().join(format!("wrangler-uploads-{}", Uuid::new_v4().simple()));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to the upload dir and index them
    ///
    /// Returns the new upload id (12 hex chars) and the stored record.
    pub async fn save(
        &self,
        filename: Option<String>,
        bytes: &[u8],
    ) -> std::io::Result<(String, UploadRecord)> {
        let upload_id: String = Uuid::new_v4().simple().to_string().chars().take(12).collect();
        let suffix = filename
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_else(|| DEFAULT_UPLOAD_EXTENSION.to_string());

        let path = self.dir.join(format!("{}{}", upload_id, suffix));
        tokio::fs::write(&path, bytes).await?;

        let record = UploadRecord { path, filename };
        self.uploads
            .write()
            .await
            .insert(upload_id.clone(), record.clone());

        tracing::info!(
            upload_id = %upload_id,
            path = %record.path.display(),
            size = bytes.len(),
            "Stored audio upload"
        );
        Ok((upload_id, record))
    }

    #[cfg(test)]
    async fn get(&self, upload_id: &str) -> Option<UploadRecord> {
        self.uploads.read().await.get(upload_id).cloned()
    }
}
