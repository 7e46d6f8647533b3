use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::errors::ServiceError;
use crate::record::Record;

/// Why the store document could not be turned into a record list.
#[derive(Debug, Error)]
pub enum StoreReadError {
    #[error("store document missing")]
    Missing,
    #[error("store document unreadable: {0}")]
    Unreadable(#[source] std::io::Error),
    #[error("store document corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreHealth {
    Ok,
    Missing,
    Unreadable,
    Corrupt,
}

impl StoreHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreHealth::Ok => "ok",
            StoreHealth::Missing => "missing",
            StoreHealth::Unreadable => "unreadable",
            StoreHealth::Corrupt => "corrupt",
        }
    }

    pub fn is_ok(&self) -> bool { matches!(self, StoreHealth::Ok) }
}

impl From<&StoreReadError> for StoreHealth {
    fn from(e: &StoreReadError) -> Self {
        match e {
            StoreReadError::Missing => StoreHealth::Missing,
            StoreReadError::Unreadable(_) => StoreHealth::Unreadable,
            StoreReadError::Corrupt(_) => StoreHealth::Corrupt,
        }
    }
}

/// Trait abstraction for the record document.
///
/// Implementors supply the raw `load`/`persist` pair; the read-all, append and
/// find-by-id semantics are shared. There is no locking between `load` and
/// `persist`: concurrent appends race and the last write wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the whole document, reporting why it could not be read.
    async fn load(&self) -> Result<Vec<Record>, StoreReadError>;

    /// Replace the whole document with `records`.
    async fn persist(&self, records: &[Record]) -> Result<(), ServiceError>;

    /// All records in insertion order. Read failures are logged and yield an empty list.
    async fn read_all(&self) -> Vec<Record> {
        match self.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(event = "store_read_failed", error = %e, "record store unreadable; serving empty list");
                Vec::new()
            }
        }
    }

    /// Create a record from `fields`, append it and rewrite the document.
    async fn append(&self, fields: Map<String, Value>) -> Result<Record, ServiceError> {
        let record = Record::create(fields, Utc::now(), &mut rand::thread_rng());
        let mut records = self.read_all().await;
        records.push(record.clone());
        self.persist(&records).await?;
        Ok(record)
    }

    /// First record whose `id` equals `id`.
    async fn find_by_id(&self, id: &str) -> Result<Record, ServiceError> {
        self.read_all()
            .await
            .into_iter()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| ServiceError::not_found("record"))
    }

    async fn health(&self) -> StoreHealth {
        match self.load().await {
            Ok(_) => StoreHealth::Ok,
            Err(e) => StoreHealth::from(&e),
        }
    }
}
