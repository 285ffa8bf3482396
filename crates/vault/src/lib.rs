//! Envelope encryption for clinical notes.
//!
//! Each note is encrypted under its own random DEK (AES-256-GCM); the DEK is
//! wrapped under a single long-lived KEK (RFC 3394 AES Key Wrap) and only the
//! wrapped form is stored.

pub mod config;
pub mod crypto;
pub mod storage;
pub mod telemetry;
pub mod vault;

pub use crypto::{CryptoError, DekBytes, Kek};
pub use storage::{MemoryStore, RecordStore, StoreError, StoredNote};
pub use vault::{AadPolicy, NoteVault, VaultError};
