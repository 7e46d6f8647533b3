use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::ServiceError;
use crate::record::Record;
use crate::storage::{RecordStore, StoreHealth};

/// Record operations on top of an injected [`RecordStore`].
///
/// By default appends race exactly as the underlying store does (last write
/// wins). With `serialize_writes` every append runs behind one async mutex.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    writer: Option<Arc<Mutex<()>>>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store, writer: None }
    }

    pub fn with_serialized_writes(store: Arc<dyn RecordStore>, serialize: bool) -> Self {
        let writer = serialize.then(|| Arc::new(Mutex::new(())));
        Self { store, writer }
    }

    pub fn serializes_writes(&self) -> bool {
        self.writer.is_some()
    }

    pub async fn list(&self) -> Vec<Record> {
        self.store.read_all().await
    }

    pub async fn create(&self, fields: Map<String, Value>) -> Result<Record, ServiceError> {
        let record = match &self.writer {
            Some(writer) => {
                let _guard = writer.lock().await;
                self.store.append(fields).await?
            }
            None => self.store.append(fields).await?,
        };
        debug!(event = "record_created", id = record.id().unwrap_or_default(), "record appended");
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> Result<Record, ServiceError> {
        self.store.find_by_id(id).await
    }

    pub async fn health(&self) -> StoreHealth {
        self.store.health().await
    }
}
