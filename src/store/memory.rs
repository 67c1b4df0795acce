//! In-memory [`DocumentStore`] for tests and throwaway runs.
//!
//! Records live in a `Vec` behind `std::sync::RwLock` and are lost when the
//! process exits. Insertion order is preserved.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::DocumentRecord;

use super::DocumentStore;

pub struct InMemoryStore {
    records: RwLock<Vec<DocumentRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Start from an existing set of records.
    pub fn with_records(records: Vec<DocumentRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create_document(&self, name: &str, path: &str) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("document store lock poisoned"))?;
        records.push(DocumentRecord::new(name, path));
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("document store lock poisoned"))?;
        Ok(records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let store = InMemoryStore::new();
        assert!(store.list_documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_are_kept() {
        let store = InMemoryStore::new();
        store
            .create_document("a.txt", "uploads/a.txt")
            .await
            .unwrap();
        store
            .create_document("a.txt", "uploads/a.txt")
            .await
            .unwrap();

        let records = store.list_documents().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.name == "a.txt"));
    }

    #[tokio::test]
    async fn test_with_records() {
        let store = InMemoryStore::with_records(vec![DocumentRecord::new("x", "uploads/x")]);
        let records = store.list_documents().await.unwrap();
        assert_eq!(records, vec![DocumentRecord::new("x", "uploads/x")]);
    }
}
