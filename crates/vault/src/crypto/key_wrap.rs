//! RFC 3394 AES Key Wrap of a DEK under the KEK.
//!
//! The KEK size selects the AES variant (16/24/32 bytes → AES-128/192/256).
//! Wrapping is deterministic; the fixed integrity check value `A6A6A6A6A6A6A6A6`
//! is embedded by the algorithm and verified on unwrap.

use aes_kw::{KekAes128, KekAes192, KekAes256};
use zeroize::Zeroizing;

use super::error::CryptoError;

/// Key-wrap operates on 64-bit semiblocks.
pub const SEMIBLOCK_LEN: usize = 8;

/// Smallest key the algorithm accepts (two semiblocks).
pub const MIN_KEY_DATA_LEN: usize = 2 * SEMIBLOCK_LEN;

/// Bytes added by wrapping.
pub const WRAP_OVERHEAD: usize = SEMIBLOCK_LEN;

enum WrappingKey {
    Aes128(KekAes128),
    Aes192(KekAes192),
    Aes256(KekAes256),
}

impl WrappingKey {
    fn new(kek: &[u8]) -> Result<Self, CryptoError> {
        let bad_len = || CryptoError::InvalidKeyLength(kek.len());
        match kek.len() {
            16 => Ok(Self::Aes128(KekAes128::from(
                <[u8; 16]>::try_from(kek).map_err(|_| bad_len())?,
            ))),
            24 => Ok(Self::Aes192(KekAes192::from(
                <[u8; 24]>::try_from(kek).map_err(|_| bad_len())?,
            ))),
            32 => Ok(Self::Aes256(KekAes256::from(
                <[u8; 32]>::try_from(kek).map_err(|_| bad_len())?,
            ))),
            _ => Err(bad_len()),
        }
    }

    fn wrap(&self, data: &[u8], out: &mut [u8]) -> Result<(), aes_kw::Error> {
        match self {
            Self::Aes128(k) => k.wrap(data, out),
            Self::Aes192(k) => k.wrap(data, out),
            Self::Aes256(k) => k.wrap(data, out),
        }
    }

    fn unwrap(&self, data: &[u8], out: &mut [u8]) -> Result<(), aes_kw::Error> {
        match self {
            Self::Aes128(k) => k.unwrap(data, out),
            Self::Aes192(k) => k.unwrap(data, out),
            Self::Aes256(k) => k.unwrap(data, out),
        }
    }
}

/// Wrap `dek` under `kek`.
///
/// The output is `dek.len() + 8` bytes (40 bytes for a 256-bit DEK).
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if `kek` is not 16, 24 or 32 bytes,
/// or if `dek` is shorter than 16 bytes or not a multiple of 8.
pub fn wrap(kek: &[u8], dek: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let key = WrappingKey::new(kek)?;
    if dek.len() < MIN_KEY_DATA_LEN || dek.len() % SEMIBLOCK_LEN != 0 {
        return Err(CryptoError::InvalidKeyLength(dek.len()));
    }

    let mut wrapped = vec![0u8; dek.len() + WRAP_OVERHEAD];
    key.wrap(dek, &mut wrapped)
        .map_err(|_| CryptoError::InvalidKeyLength(dek.len()))?;
    Ok(wrapped)
}

/// Unwrap a value produced by [`wrap`] and verify its integrity check value.
///
/// On failure nothing of the partially unwrapped key is returned; the scratch
/// buffer is zeroed when dropped.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if `kek` is not 16, 24 or 32 bytes.
/// Returns [`CryptoError::UnwrapIntegrityFailure`] for a wrong KEK, a corrupted
/// wrapped value, or a truncated or padded input.
pub fn unwrap(kek: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let key = WrappingKey::new(kek)?;
    if wrapped.len() < MIN_KEY_DATA_LEN + WRAP_OVERHEAD || wrapped.len() % SEMIBLOCK_LEN != 0 {
        return Err(CryptoError::UnwrapIntegrityFailure);
    }

    let mut dek = Zeroizing::new(vec![0u8; wrapped.len() - WRAP_OVERHEAD]);
    key.unwrap(wrapped, dek.as_mut_slice())
        .map_err(|_| CryptoError::UnwrapIntegrityFailure)?;
    Ok(dek)
}
