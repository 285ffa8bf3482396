//! [`NoteVault`]: stores and reads clinical notes with envelope encryption.
//!
//! # Write path
//!
//! 1. Generate a fresh DEK and encrypt the note text under it.
//! 2. Wrap the DEK under the KEK.
//! 3. Hand wrapped DEK, nonce and ciphertext (plus cleartext metadata) to the store.
//!
//! # Read path
//!
//! 1. Fetch the three artifacts from the store.
//! 2. Unwrap the DEK under the KEK, then verify and decrypt the ciphertext.
//!
//! # Security invariants
//!
//! - Note text, DEKs and the KEK are never logged or included in errors.
//! - A missing note and a note that fails any integrity check look the same to
//!   callers ([`PublicError::NotFoundOrInaccessible`]).

use chrono::Utc;
use common::protocol::LayoutError;
use common::{NoteId, NoteMeta, NoteSummary, NoteView, PublicError};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crypto::{envelope, CryptoError, Kek};
use crate::storage::{RecordStore, StoreError, StoredNote};

/// What, if anything, is bound to a note's ciphertext as associated data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AadPolicy {
    /// No associated data.
    #[default]
    None,
    /// The note id bytes; a ciphertext moved to another id no longer verifies.
    RecordId,
}

/// Errors produced by the vault.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The caller supplied unusable input.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The stored artifacts do not match the persisted layout.
    #[error("stored record is malformed: {0}")]
    InvalidRecord(#[from] LayoutError),

    /// The note decrypted but is not UTF-8 text.
    #[error("decrypted note is not valid UTF-8")]
    InvalidUtf8,
}

impl VaultError {
    /// Map to the error a caller is allowed to see.
    pub fn public(&self) -> PublicError {
        match self {
            VaultError::InvalidInput(msg) => PublicError::BadRequest((*msg).into()),
            VaultError::Crypto(e) if e.is_integrity_failure() => {
                PublicError::NotFoundOrInaccessible
            }
            VaultError::Crypto(_) => PublicError::Internal("encryption failed".into()),
            VaultError::Storage(StoreError::NotFound(_)) => PublicError::NotFoundOrInaccessible,
            VaultError::Storage(StoreError::Unavailable(_)) => {
                PublicError::Unavailable("note storage unavailable".into())
            }
            VaultError::Storage(StoreError::Duplicate(_)) => {
                PublicError::Internal("storage conflict".into())
            }
            VaultError::InvalidRecord(_) | VaultError::InvalidUtf8 => {
                PublicError::NotFoundOrInaccessible
            }
        }
    }
}

/// Encrypts notes on the way into a [`RecordStore`] and decrypts them on the way out.
///
/// Holds no mutable state of its own; share it behind an `Arc` across tasks.
#[derive(Debug)]
pub struct NoteVault<S> {
    kek: Kek,
    store: S,
    aad_policy: AadPolicy,
}

impl<S: RecordStore> NoteVault<S> {
    /// Create a vault that wraps DEKs under `kek` and persists into `store`.
    pub fn new(kek: Kek, store: S) -> Self {
        Self {
            kek,
            store,
            aad_policy: AadPolicy::default(),
        }
    }

    /// Set the associated-data policy. Must match the policy records were written with.
    pub fn with_aad_policy(mut self, aad_policy: AadPolicy) -> Self {
        self.aad_policy = aad_policy;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encrypt and persist a new note, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidInput`] for an empty author or note text,
    /// [`VaultError::Crypto`] if sealing fails and [`VaultError::Storage`] if
    /// the store rejects the record.
    pub async fn create_note(
        &self,
        patient_id: u64,
        author: &str,
        text: &str,
    ) -> Result<NoteId, VaultError> {
        if author.trim().is_empty() {
            return Err(VaultError::InvalidInput("author must not be empty"));
        }
        if text.is_empty() {
            return Err(VaultError::InvalidInput("note text must not be empty"));
        }

        let id = Uuid::new_v4();
        let sealed = envelope::seal(&mut OsRng, &self.kek, text.as_bytes(), self.aad(&id))?;
        let note = StoredNote {
            meta: NoteMeta {
                patient_id,
                author: author.to_owned(),
                created_at: Utc::now(),
            },
            sealed,
        };
        self.store.store(id, note).await?;

        info!(note_id = %id, patient_id, "note sealed and stored");
        Ok(id)
    }

    /// Fetch and decrypt a note.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the note cannot be fetched,
    /// [`VaultError::InvalidRecord`] or [`VaultError::Crypto`] if it fails
    /// layout or integrity checks, [`VaultError::InvalidUtf8`] if the
    /// plaintext is not text.
    pub async fn read_note(&self, id: NoteId) -> Result<NoteView, VaultError> {
        let StoredNote { meta, sealed } = self.store.fetch(id).await?;

        if let Err(e) = sealed.validate_layout() {
            warn!(note_id = %id, error = %e, "stored note has invalid layout");
            return Err(e.into());
        }

        let plaintext = envelope::open(&self.kek, &sealed, self.aad(&id)).map_err(|e| {
            warn!(note_id = %id, error = %e, "stored note failed integrity check");
            e
        })?;
        let content = String::from_utf8(plaintext).map_err(|e| {
            // Clear the rejected bytes before they are dropped.
            zeroize::Zeroize::zeroize(&mut e.into_bytes());
            VaultError::InvalidUtf8
        })?;

        info!(note_id = %id, "note decrypted");
        Ok(NoteView { id, meta, content })
    }

    /// Metadata of stored notes, optionally for one patient. Nothing is decrypted.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the store cannot list records.
    pub async fn list_notes(&self, patient_id: Option<u64>) -> Result<Vec<NoteSummary>, VaultError> {
        Ok(self.store.list(patient_id).await?)
    }

    /// Delete a note. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the store fails.
    pub async fn delete_note(&self, id: NoteId) -> Result<bool, VaultError> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!(note_id = %id, "note deleted");
        }
        Ok(deleted)
    }

    fn aad<'a>(&self, id: &'a NoteId) -> Option<&'a [u8]> {
        match self.aad_policy {
            AadPolicy::None => None,
            AadPolicy::RecordId => Some(id.as_bytes()),
        }
    }
}
