//! Boundary with the storage collaborator that persists sealed notes.
//!
//! The vault only ever hands the store ciphertext, a nonce, a wrapped DEK and
//! cleartext metadata. Plaintext and unwrapped keys never cross this boundary.

pub mod memory;

use std::future::Future;

use common::{NoteId, NoteMeta, NoteSummary, SealedRecord};
use thiserror::Error;

pub use memory::MemoryStore;

/// Errors produced by a [`RecordStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record exists under this id.
    #[error("record {0} not found")]
    NotFound(NoteId),

    /// A record already exists under this id.
    #[error("record {0} already exists")]
    Duplicate(NoteId),

    /// The backing store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One persisted row: cleartext metadata plus the sealed artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNote {
    pub meta: NoteMeta,
    pub sealed: SealedRecord,
}

/// Persistence for sealed notes.
pub trait RecordStore: Send + Sync {
    /// Persist a new record. Existing ids are never overwritten.
    fn store(
        &self,
        id: NoteId,
        note: StoredNote,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Load the record stored under `id`.
    fn fetch(&self, id: NoteId) -> impl Future<Output = Result<StoredNote, StoreError>> + Send;

    /// Remove a record. Returns `false` if nothing was stored under `id`.
    fn delete(&self, id: NoteId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Metadata of all records, optionally for one patient, newest first.
    fn list(
        &self,
        patient_id: Option<u64>,
    ) -> impl Future<Output = Result<Vec<NoteSummary>, StoreError>> + Send;
}
