//! The write and read paths of envelope encryption.
//!
//! Write: fresh DEK → encrypt plaintext → wrap DEK under KEK.
//! Read: unwrap DEK under KEK → verify and decrypt.

use common::SealedRecord;
use rand::{CryptoRng, RngCore};

use super::cipher;
use super::error::CryptoError;
use super::key_wrap;
use super::keys::{DekBytes, Kek};

/// Encrypt `plaintext` under a freshly generated DEK and wrap that DEK.
///
/// The DEK is dropped (and zeroed) before returning; only its wrapped form
/// leaves this function.
///
/// # Errors
///
/// Propagates any [`CryptoError`] from key generation, encryption or wrapping.
pub fn seal<R: RngCore + CryptoRng>(
    rng: &mut R,
    kek: &Kek,
    plaintext: &[u8],
    aad: Option<&[u8]>,
) -> Result<SealedRecord, CryptoError> {
    let dek = cipher::generate_key(rng)?;
    let payload = cipher::encrypt(rng, plaintext, aad, dek.as_ref())?;
    let wrapped_dek = key_wrap::wrap(kek.as_bytes(), dek.as_ref())?;

    Ok(SealedRecord {
        wrapped_dek,
        nonce: payload.nonce.to_vec(),
        ciphertext: payload.ciphertext,
    })
}

/// Recover the plaintext of a [`SealedRecord`].
///
/// # Errors
///
/// Returns [`CryptoError::UnwrapIntegrityFailure`] if the DEK cannot be
/// unwrapped under `kek`, [`CryptoError::AuthenticationFailure`] if the
/// ciphertext does not verify.
pub fn open(kek: &Kek, record: &SealedRecord, aad: Option<&[u8]>) -> Result<Vec<u8>, CryptoError> {
    let unwrapped = key_wrap::unwrap(kek.as_bytes(), &record.wrapped_dek)?;
    let dek = DekBytes::from_slice(&unwrapped)?;
    cipher::decrypt(&record.nonce, &record.ciphertext, aad, dek.as_ref())
}
