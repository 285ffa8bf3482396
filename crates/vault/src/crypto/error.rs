//! Failure kinds of the crypto layer.

use thiserror::Error;

/// Errors produced by [`cipher`](super::cipher) and [`key_wrap`](super::key_wrap).
///
/// Integrity failures carry no detail about their cause. None of these are
/// worth retrying without changing an input.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// The secure random source could not produce bytes.
    #[error("secure random source unavailable")]
    EntropyFailure,

    /// A KEK or DEK of unsupported size was supplied.
    #[error("unsupported key length: {0} bytes")]
    InvalidKeyLength(usize),

    /// AES-GCM tag verification failed.
    #[error("cannot decrypt: authentication failed")]
    AuthenticationFailure,

    /// The key-wrap integrity check value did not verify.
    #[error("cannot unwrap key: integrity check failed")]
    UnwrapIntegrityFailure,

    /// Plaintext or associated data exceed the AES-GCM input limits.
    #[error("payload exceeds AES-GCM limits")]
    PayloadTooLarge,
}

impl CryptoError {
    /// `true` for failures that mean "this ciphertext or wrapped key cannot be
    /// opened with these inputs".
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            CryptoError::AuthenticationFailure | CryptoError::UnwrapIntegrityFailure
        )
    }
}
