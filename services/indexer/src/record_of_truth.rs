//! In-memory [`RecordOfTruth`] used by tests and the CLI's single-process
//! `index` command in place of a real relational store (SPEC_FULL §4.8).

use async_trait::async_trait;
use retrieval_core::traits::{DocumentMetadataRecord, RecordOfTruth};
use retrieval_core::Result;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    locked: HashSet<String>,
    metadata: HashMap<String, DocumentMetadataRecord>,
    access: HashMap<String, BTreeSet<String>>,
    document_sets: HashMap<String, BTreeSet<String>>,
}

#[derive(Default)]
pub struct InMemoryRecordOfTruth {
    state: Mutex<State>,
}

impl InMemoryRecordOfTruth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/demo seam: set the access list a document should resolve to,
    /// bypassing a separate ACL-sync connector this crate doesn't model.
    pub fn seed_access(&self, document_id: &str, access: BTreeSet<String>) {
        self.state
            .lock()
            .unwrap()
            .access
            .insert(document_id.to_string(), access);
    }

    pub fn seed_document_sets(&self, document_id: &str, sets: BTreeSet<String>) {
        self.state
            .lock()
            .unwrap()
            .document_sets
            .insert(document_id.to_string(), sets);
    }

    /// Test seam: whether `document_id` is currently held locked.
    pub fn is_locked(&self, document_id: &str) -> bool {
        self.state.lock().unwrap().locked.contains(document_id)
    }
}

#[async_trait]
impl RecordOfTruth for InMemoryRecordOfTruth {
    async fn lock_documents(&self, document_ids: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for id in document_ids {
            state.locked.insert(id.clone());
        }
        Ok(())
    }

    async fn unlock_documents(&self, document_ids: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for id in document_ids {
            state.locked.remove(id);
        }
        Ok(())
    }

    async fn upsert_metadata(&self, records: &[DocumentMetadataRecord]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for record in records {
            state
                .metadata
                .insert(record.document_id.clone(), record.clone());
        }
        Ok(())
    }

    async fn fetch_access(
        &self,
        document_ids: &[String],
    ) -> Result<HashMap<String, BTreeSet<String>>> {
        let state = self.state.lock().unwrap();
        Ok(document_ids
            .iter()
            .map(|id| {
                let access = state.access.get(id).cloned().unwrap_or_else(|| {
                    [retrieval_core::chunk::PUBLIC_ACL_ENTRY.to_string()].into()
                });
                (id.clone(), access)
            })
            .collect())
    }

    async fn fetch_document_sets(
        &self,
        document_ids: &[String],
    ) -> Result<HashMap<String, BTreeSet<String>>> {
        let state = self.state.lock().unwrap();
        Ok(document_ids
            .iter()
            .map(|id| (id.clone(), state.document_sets.get(id).cloned().unwrap_or_default()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn access_defaults_to_public() {
        let store = InMemoryRecordOfTruth::new();
        let access = store.fetch_access(&["doc1".to_string()]).await.unwrap();
        assert!(access["doc1"].contains(retrieval_core::chunk::PUBLIC_ACL_ENTRY));
    }

    #[tokio::test]
    async fn seeded_access_overrides_default() {
        let store = InMemoryRecordOfTruth::new();
        store.seed_access("doc1", ["u:alice".to_string()].into());
        let access = store.fetch_access(&["doc1".to_string()]).await.unwrap();
        assert_eq!(access["doc1"], ["u:alice".to_string()].into());
    }

    #[tokio::test]
    async fn lock_then_unlock_clears_state() {
        let store = InMemoryRecordOfTruth::new();
        store.lock_documents(&["doc1".to_string()]).await.unwrap();
        assert!(store.state.lock().unwrap().locked.contains("doc1"));
        store.unlock_documents(&["doc1".to_string()]).await.unwrap();
        assert!(!store.state.lock().unwrap().locked.contains("doc1"));
    }
}
