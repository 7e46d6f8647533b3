use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::uploads::namer::{derive_name, now_millis};

/// Metadata of a completed upload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredUpload {
    pub filename: String,
    pub original_name: String,
    pub size: u64,
}

/// Owns the uploads directory and the names written into it.
#[derive(Clone, Debug)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the directory (and parents) if absent.
    pub async fn open<P: Into<PathBuf>>(dir: P) -> Result<Arc<Self>, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Arc::new(Self { dir }))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Start a streamed upload. An existing file with the derived name is overwritten.
    pub async fn begin(&self, original_name: &str) -> Result<UploadWriter, ServiceError> {
        let filename = derive_name(original_name, now_millis());
        let path = self.dir.join(&filename);
        let file = fs::File::create(&path).await?;
        Ok(UploadWriter {
            file,
            path,
            filename,
            original_name: original_name.to_string(),
            size: 0,
        })
    }

    /// Write a whole blob in one go.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload, ServiceError> {
        let mut writer = self.begin(original_name).await?;
        if let Err(e) = writer.write_chunk(bytes).await {
            writer.abort().await;
            return Err(e);
        }
        writer.finish().await
    }
}

/// An in-progress upload. Call [`finish`](Self::finish) or [`abort`](Self::abort).
pub struct UploadWriter {
    file: fs::File,
    path: PathBuf,
    filename: String,
    original_name: String,
    size: u64,
}

impl UploadWriter {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), ServiceError> {
        self.file.write_all(chunk).await?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    pub async fn finish(mut self) -> Result<StoredUpload, ServiceError> {
        self.file.flush().await?;
        info!(event = "upload_stored", filename = %self.filename, size = self.size, "upload stored");
        Ok(StoredUpload {
            filename: self.filename,
            original_name: self.original_name,
            size: self.size,
        })
    }

    /// Drop the partially written file.
    pub async fn abort(self) {
        drop(self.file);
        if let Err(e) = fs::remove_file(&self.path).await {
            warn!(event = "upload_abort_cleanup_failed", path = %self.path.display(), error = %e, "could not remove partial upload");
        }
    }
}
