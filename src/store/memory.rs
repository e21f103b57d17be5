//! In-memory submission store. Lives for the life of the process, never evicts.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::SubmissionStore;
use crate::error::StoreError;
use crate::submission::SubmissionRecord;

/// Unbounded, insertion-ordered store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<SubmissionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SubmissionStore for InMemoryStore {
    async fn append(&self, record: SubmissionRecord) -> Result<(), StoreError> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::submission::{RequestType, SubmissionPayload};

    fn record(email: &str, product_id: &str) -> SubmissionRecord {
        SubmissionPayload {
            email: Some(email.into()),
            product_id: Some(product_id.into()),
            ..Default::default()
        }
        .validate(RequestType::BackInStock)
        .unwrap()
    }

    #[tokio::test]
    async fn starts_empty() {
        let store = InMemoryStore::new();
        assert!(store.is_empty().await);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn preserves_insertion_order() {
        let store = InMemoryStore::new();
        let a = record("a@x.com", "1");
        let b = record("b@x.com", "2");
        store.append(a.clone()).await.unwrap();
        store.append(b.clone()).await.unwrap();

        assert_eq!(store.list_all().await.unwrap(), vec![a, b]);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_kept() {
        let store = Arc::new(InMemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .append(record(&format!("user{i}@x.com"), &i.to_string()))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len().await, 50);
    }
}
