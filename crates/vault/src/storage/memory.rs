//! [`MemoryStore`]: in-process [`RecordStore`] backed by a `HashMap`.

use std::collections::HashMap;
use std::sync::Arc;

use common::{NoteId, NoteSummary};
use tokio::sync::RwLock;

use super::{RecordStore, StoreError, StoredNote};

/// Thread-safe in-memory store.
///
/// Wraps an `Arc<RwLock<HashMap<..>>>` so clones share the same records and
/// concurrent readers do not block each other.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<NoteId, StoredNote>>>,
}

impl MemoryStore {
    /// Create a new, empty [`MemoryStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns `true` if no records are held.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Apply `f` to the stored record in place. Test and repair hook.
    pub async fn modify<F>(&self, id: NoteId, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut StoredNote),
    {
        let mut lock = self.inner.write().await;
        let note = lock.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        f(note);
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    async fn store(&self, id: NoteId, note: StoredNote) -> Result<(), StoreError> {
        let mut lock = self.inner.write().await;
        if lock.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        lock.insert(id, note);
        Ok(())
    }

    async fn fetch(&self, id: NoteId) -> Result<StoredNote, StoreError> {
        let lock = self.inner.read().await;
        lock.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: NoteId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.remove(&id).is_some())
    }

    async fn list(&self, patient_id: Option<u64>) -> Result<Vec<NoteSummary>, StoreError> {
        let lock = self.inner.read().await;
        let mut notes: Vec<NoteSummary> = lock
            .iter()
            .filter(|(_, n)| patient_id.map_or(true, |p| n.meta.patient_id == p))
            .map(|(id, n)| NoteSummary {
                id: *id,
                meta: n.meta.clone(),
            })
            .collect();
        notes.sort_by(|a, b| b.meta.created_at.cmp(&a.meta.created_at));
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use common::{NoteMeta, SealedRecord};
    use uuid::Uuid;

    use super::*;

    fn note(patient_id: u64, age_secs: i64) -> StoredNote {
        StoredNote {
            meta: NoteMeta {
                patient_id,
                author: "dr.sen".into(),
                created_at: Utc::now() - Duration::seconds(age_secs),
            },
            sealed: SealedRecord {
                wrapped_dek: vec![0u8; 40],
                nonce: vec![0u8; 12],
                ciphertext: vec![0u8; 16],
            },
        }
    }

    #[tokio::test]
    async fn initially_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);
        assert_eq!(
            store.fetch(Uuid::nil()).await,
            Err(StoreError::NotFound(Uuid::nil()))
        );
    }

    #[tokio::test]
    async fn store_and_fetch() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let n = note(1, 0);
        store.store(id, n.clone()).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.fetch(id).await.unwrap(), n);
    }

    #[tokio::test]
    async fn duplicate_id_rejected() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.store(id, note(1, 0)).await.unwrap();
        assert_eq!(
            store.store(id, note(2, 0)).await,
            Err(StoreError::Duplicate(id))
        );
        assert_eq!(store.fetch(id).await.unwrap().meta.patient_id, 1);
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.store(id, note(1, 0)).await.unwrap();
        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn list_filters_by_patient_newest_first() {
        let store = MemoryStore::new();
        let old = Uuid::new_v4();
        let new = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.store(old, note(7, 60)).await.unwrap();
        store.store(new, note(7, 0)).await.unwrap();
        store.store(other, note(8, 30)).await.unwrap();

        let ids: Vec<_> = store.list(Some(7)).await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![new, old]);
        assert_eq!(store.list(None).await.unwrap().len(), 3);
        assert!(store.list(Some(99)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_share_records() {
        let store = MemoryStore::new();
        let clone = store.clone();
        let id = Uuid::new_v4();
        store.store(id, note(1, 0)).await.unwrap();
        assert!(clone.fetch(id).await.is_ok());
    }

    #[tokio::test]
    async fn modify_missing_record_fails() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            store.modify(id, |n| n.meta.patient_id = 2).await,
            Err(StoreError::NotFound(id))
        );
    }
}
