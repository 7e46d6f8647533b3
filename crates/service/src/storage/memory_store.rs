use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::record::Record;
use crate::storage::record_store::{RecordStore, StoreReadError};

/// In-memory record store with the same contract as the file-backed one.
/// Used by tests and for ephemeral runs.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<Vec<Record>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_records(records: Vec<Record>) -> Arc<Self> {
        Arc::new(Self { inner: Arc::new(RwLock::new(records)) })
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load(&self) -> Result<Vec<Record>, StoreReadError> {
        Ok(self.inner.read().await.clone())
    }

    async fn persist(&self, records: &[Record]) -> Result<(), ServiceError> {
        let mut guard = self.inner.write().await;
        *guard = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn memory_store_append_and_find() -> Result<(), anyhow::Error> {
        let store = MemoryRecordStore::new();
        assert!(store.read_all().await.is_empty());

        let a = store.append(obj(json!({"x": 1}))).await?;
        let b = store.append(obj(json!({"x": 1}))).await?;
        assert_ne!(a.id(), b.id());

        let all = store.read_all().await;
        assert_eq!(all, vec![a.clone(), b]);
        assert_eq!(store.find_by_id(a.id().unwrap()).await?.get("x"), Some(&json!(1)));
        assert!(store.find_by_id("nope").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn find_returns_first_match_on_duplicate_ids() -> Result<(), anyhow::Error> {
        let dup = |n: i64| Record::from(obj(json!({"id": "same", "n": n})));
        let store = MemoryRecordStore::with_records(vec![dup(1), dup(2)]);
        assert_eq!(store.find_by_id("same").await?.get("n"), Some(&json!(1)));
        Ok(())
    }
}
