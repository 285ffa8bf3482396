//! Record layout and note types exchanged with the storage collaborator.
//!
//! # Persisted layout
//!
//! | field         | encoding  | length                |
//! |---------------|-----------|-----------------------|
//! | `wrapped_dek` | raw bytes | DEK length + 8        |
//! | `nonce`       | raw bytes | 12                    |
//! | `ciphertext`  | raw bytes | plaintext length + 16 |
//!
//! When serialised as JSON the byte fields are standard base64.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a stored note.
pub type NoteId = Uuid;

/// Byte length of an AES-GCM nonce.
pub const NONCE_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Bytes the key-wrap algorithm adds to the wrapped key.
pub const WRAP_OVERHEAD: usize = 8;

/// Smallest possible wrapped key: a 16-byte key plus the integrity block.
pub const MIN_WRAPPED_LEN: usize = 16 + WRAP_OVERHEAD;

/// Prefix of the compact text form of a [`SealedRecord`].
pub const VERSION_PREFIX: &str = "v1";

/// Problems with the shape of a [`SealedRecord`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("nonce must be {NONCE_LEN} bytes, got {0}")]
    NonceLength(usize),

    #[error("wrapped DEK has invalid length {0}")]
    WrappedDekLength(usize),

    #[error("ciphertext shorter than the {TAG_LEN}-byte tag")]
    CiphertextTooShort,

    #[error("invalid sealed record format")]
    InvalidFormat,
}

/// The three artifacts persisted per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedRecord {
    /// DEK wrapped under the KEK.
    #[serde(with = "b64")]
    pub wrapped_dek: Vec<u8>,
    /// Per-encryption random nonce.
    #[serde(with = "b64")]
    pub nonce: Vec<u8>,
    /// Ciphertext with the authentication tag appended.
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
}

impl SealedRecord {
    /// Check the byte lengths against the persisted layout.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutError`] found.
    pub fn validate_layout(&self) -> Result<(), LayoutError> {
        let wrapped = self.wrapped_dek.len();
        if wrapped < MIN_WRAPPED_LEN || wrapped % 8 != 0 {
            return Err(LayoutError::WrappedDekLength(wrapped));
        }
        if self.nonce.len() != NONCE_LEN {
            return Err(LayoutError::NonceLength(self.nonce.len()));
        }
        if self.ciphertext.len() < TAG_LEN {
            return Err(LayoutError::CiphertextTooShort);
        }
        Ok(())
    }

    /// Length of the plaintext this record decrypts to.
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_LEN)
    }

    /// Encode as `v1.<wrapped_dek>.<nonce>.<ciphertext>` (base64url, no padding).
    pub fn to_string_repr(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            VERSION_PREFIX,
            URL_SAFE_NO_PAD.encode(&self.wrapped_dek),
            URL_SAFE_NO_PAD.encode(&self.nonce),
            URL_SAFE_NO_PAD.encode(&self.ciphertext),
        )
    }

    /// Parse the compact text form produced by [`SealedRecord::to_string_repr`].
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidFormat`] if the prefix, part count or
    /// base64 is wrong, or a layout error if the decoded lengths are invalid.
    pub fn from_str_repr(s: &str) -> Result<Self, LayoutError> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4 || parts[0] != VERSION_PREFIX {
            return Err(LayoutError::InvalidFormat);
        }
        let decode = |p: &str| {
            URL_SAFE_NO_PAD
                .decode(p)
                .map_err(|_| LayoutError::InvalidFormat)
        };
        let record = Self {
            wrapped_dek: decode(parts[1])?,
            nonce: decode(parts[2])?,
            ciphertext: decode(parts[3])?,
        };
        record.validate_layout()?;
        Ok(record)
    }
}

/// Cleartext metadata kept next to a sealed note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMeta {
    pub patient_id: u64,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Listing entry: metadata only, never the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: NoteId,
    #[serde(flatten)]
    pub meta: NoteMeta,
}

/// A decrypted note as returned to an authorised reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteView {
    pub id: NoteId,
    #[serde(flatten)]
    pub meta: NoteMeta,
    pub content: String,
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"NOT_FOUND"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

mod b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}
