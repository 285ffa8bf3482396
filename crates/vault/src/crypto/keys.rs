//! Containers for key material.
//!
//! Both types zero their bytes on drop and never print them.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::cipher::KEY_LEN;
use super::error::CryptoError;

/// Fixed-size buffer holding exactly one [`KEY_LEN`]-byte Data Encryption Key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DekBytes([u8; KEY_LEN]);

impl DekBytes {
    /// Copy a DEK out of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] unless `bytes` is [`KEY_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength(bytes.len()));
        }
        let mut dek = Self::zeroed();
        dek.0.copy_from_slice(bytes);
        Ok(dek)
    }

    pub(crate) fn zeroed() -> Self {
        Self([0u8; KEY_LEN])
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.0
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for DekBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for DekBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DekBytes([REDACTED])")
    }
}

/// Key Encryption Key supplied by the key-management collaborator.
///
/// Accepts the three AES key sizes (16, 24 or 32 bytes).
#[derive(Clone)]
pub struct Kek(Zeroizing<Vec<u8>>);

impl Kek {
    /// Copy a KEK out of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] for any length other than 16, 24 or 32.
    pub fn new(bytes: &[u8]) -> Result<Self, CryptoError> {
        match bytes.len() {
            16 | 24 | 32 => Ok(Self(Zeroizing::new(bytes.to_vec()))),
            n => Err(CryptoError::InvalidKeyLength(n)),
        }
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key size in bits.
    pub fn bits(&self) -> usize {
        self.0.len() * 8
    }
}

impl fmt::Debug for Kek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kek(AES-{}, [REDACTED])", self.bits())
    }
}
