use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::Arc,
};

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use crate::errors::ServiceError;
use crate::record::Record;
use crate::storage::record_store::{RecordStore, StoreReadError};

/// JSON file-backed record store.
///
/// The file holds a single JSON array of records, pretty-printed with two-space
/// indentation. Every call goes to disk; nothing is cached between requests.
#[derive(Clone, Debug)]
pub struct JsonFileRecordStore {
    file_path: PathBuf,
}

impl JsonFileRecordStore {
    /// Initialize the store from a path. Creates parent directories and seeds `[]` if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        if fs::metadata(&file_path).await.is_err() {
            fs::write(&file_path, "[]").await?;
            info!(event = "data_file_seeded", path = %file_path.display(), "created empty data document");
        }
        Ok(Arc::new(Self { file_path }))
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn load(&self) -> Result<Vec<Record>, StoreReadError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreReadError::Missing),
            Err(e) => return Err(StoreReadError::Unreadable(e)),
        };
        serde_json::from_slice(&bytes).map_err(StoreReadError::Corrupt)
    }

    async fn persist(&self, records: &[Record]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(records).map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(&self.file_path, data).await?;
        Ok(())
    }
}
