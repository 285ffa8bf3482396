//! Common types, record layout definitions, and errors shared across `note-vault` crates.

pub mod error;
pub mod protocol;

pub use error::PublicError;
pub use protocol::{NoteId, NoteMeta, NoteSummary, NoteView, SealedRecord};
