//! Envelope-encryption primitives.
//!
//! This module is free of storage, configuration and async concerns. Every
//! function is a pure transform over its explicit inputs plus an injected
//! random source, so it may be called from any number of threads at once.
//!
//! - [`cipher`]: per-record DEK generation and AES-256-GCM encryption.
//! - [`key_wrap`]: RFC 3394 AES Key Wrap of a DEK under the KEK.
//! - [`envelope`]: the write and read paths composed from the two.
//!
//! # Record format
//!
//! ```text
//! wrapped_dek = AES-KW(KEK, DEK)            (DEK length + 8 bytes)
//! nonce       = 12 random bytes
//! ciphertext  = AES-GCM(DEK, nonce, plaintext, aad) || tag   (+16 bytes)
//! ```

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod key_wrap;
pub mod keys;

pub use cipher::{EncryptedPayload, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use error::CryptoError;
pub use keys::{DekBytes, Kek};
