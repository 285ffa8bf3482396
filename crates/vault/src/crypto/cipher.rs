//! AES-256-GCM encryption of a single record under its own DEK.
//!
//! Every call to [`encrypt`] draws a fresh 96-bit nonce from the injected
//! random source. Because a DEK is generated per record and used for exactly
//! one encryption, a (DEK, nonce) pair can never repeat.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::{CryptoRng, RngCore};

use super::error::CryptoError;
use super::keys::DekBytes;

pub use common::protocol::{NONCE_LEN, TAG_LEN};

/// Byte length of a DEK (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Output of [`encrypt`]: the nonce and the ciphertext with its tag appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext followed by the 16-byte authentication tag.
    pub ciphertext: Vec<u8>,
}

/// Generate a fresh DEK from `rng`.
///
/// # Errors
///
/// Returns [`CryptoError::EntropyFailure`] if the random source fails.
pub fn generate_key<R: RngCore + CryptoRng>(rng: &mut R) -> Result<DekBytes, CryptoError> {
    let mut dek = DekBytes::zeroed();
    rng.try_fill_bytes(dek.as_mut_bytes())
        .map_err(|_| CryptoError::EntropyFailure)?;
    Ok(dek)
}

/// Encrypt `plaintext` under `dek` with a random nonce drawn from `rng`.
///
/// `None` associated data is the same as an empty slice.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if `dek` is not [`KEY_LEN`] bytes,
/// [`CryptoError::EntropyFailure`] if no nonce could be drawn.
pub fn encrypt<R: RngCore + CryptoRng>(
    rng: &mut R,
    plaintext: &[u8],
    aad: Option<&[u8]>,
    dek: &[u8],
) -> Result<EncryptedPayload, CryptoError> {
    let cipher = build_cipher(dek)?;

    let mut nonce = [0u8; NONCE_LEN];
    rng.try_fill_bytes(&mut nonce)
        .map_err(|_| CryptoError::EntropyFailure)?;

    seal(&cipher, nonce, plaintext, aad)
}

/// Encrypt with a caller-chosen nonce.
///
/// Only for known-answer tests and deterministic round trips. Reusing a nonce
/// under one DEK destroys both confidentiality and integrity.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if `dek` is not [`KEY_LEN`] bytes.
pub fn encrypt_with_nonce(
    nonce: [u8; NONCE_LEN],
    plaintext: &[u8],
    aad: Option<&[u8]>,
    dek: &[u8],
) -> Result<EncryptedPayload, CryptoError> {
    let cipher = build_cipher(dek)?;
    seal(&cipher, nonce, plaintext, aad)
}

/// Verify and decrypt `ciphertext` (tag appended) under `dek`.
///
/// No plaintext is returned unless the tag verifies.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if `dek` is not [`KEY_LEN`] bytes.
/// Returns [`CryptoError::AuthenticationFailure`] for a wrong key, a tampered
/// ciphertext or nonce, mismatched associated data, or a malformed nonce or
/// ciphertext. The cases are indistinguishable.
pub fn decrypt(
    nonce: &[u8],
    ciphertext: &[u8],
    aad: Option<&[u8]>,
    dek: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = build_cipher(dek)?;
    if nonce.len() != NONCE_LEN || ciphertext.len() < TAG_LEN {
        return Err(CryptoError::AuthenticationFailure);
    }
    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: aad.unwrap_or_default(),
            },
        )
        .map_err(|_| CryptoError::AuthenticationFailure)
}

fn seal(
    cipher: &Aes256Gcm,
    nonce: [u8; NONCE_LEN],
    plaintext: &[u8],
    aad: Option<&[u8]>,
) -> Result<EncryptedPayload, CryptoError> {
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: aad.unwrap_or_default(),
            },
        )
        .map_err(|_| CryptoError::PayloadTooLarge)?;

    Ok(EncryptedPayload { nonce, ciphertext })
}

fn build_cipher(dek: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    if dek.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeyLength(dek.len()));
    }
    Aes256Gcm::new_from_slice(dek).map_err(|_| CryptoError::InvalidKeyLength(dek.len()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::OsRng, rngs::StdRng, SeedableRng};

    use super::*;

    /// Random source that always fails.
    struct DeadRng;

    impl RngCore for DeadRng {
        fn next_u32(&mut self) -> u32 {
            unreachable!("only try_fill_bytes is used")
        }
        fn next_u64(&mut self) -> u64 {
            unreachable!("only try_fill_bytes is used")
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            unreachable!("only try_fill_bytes is used")
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source offline"))
        }
    }

    impl CryptoRng for DeadRng {}

    fn random_dek() -> DekBytes {
        generate_key(&mut OsRng).unwrap()
    }

    #[test]
    fn known_answer_gcm_test_case_14() {
        let dek = [0u8; KEY_LEN];
        let out = encrypt_with_nonce([0u8; NONCE_LEN], &[0u8; 16], None, &dek).unwrap();
        assert_eq!(
            hex::encode(&out.ciphertext),
            "cea7403d4d606b6e074ec5d3baf39d18d0d1c8a799996bf0265b98b5d48ab919"
        );
    }

    #[test]
    fn known_answer_empty_plaintext_is_tag_only() {
        let dek = [0u8; KEY_LEN];
        let out = encrypt_with_nonce([0u8; NONCE_LEN], b"", None, &dek).unwrap();
        assert_eq!(hex::encode(&out.ciphertext), "530f8afbc74536b9a963b4f1c4cb738b");
        assert!(decrypt(&out.nonce, &out.ciphertext, None, &dek).unwrap().is_empty());
    }

    #[test]
    fn generate_key_is_32_bytes() {
        let dek = random_dek();
        assert_eq!(dek.as_bytes().len(), KEY_LEN);
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let dek = random_dek();
        let plaintext = b"BP stable. Continue meds.";
        let out = encrypt(&mut OsRng, plaintext, None, dek.as_ref()).unwrap();
        assert_eq!(out.ciphertext.len(), plaintext.len() + TAG_LEN);
        let decrypted = decrypt(&out.nonce, &out.ciphertext, None, dek.as_ref()).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn fixed_nonce_round_trip_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let dek = generate_key(&mut rng).unwrap();
        let nonce = [0x24u8; NONCE_LEN];
        let plaintext = b"Patient reports improved sleep.";

        let a = encrypt_with_nonce(nonce, plaintext, Some(b"note-17"), dek.as_ref()).unwrap();
        let b = encrypt_with_nonce(nonce, plaintext, Some(b"note-17"), dek.as_ref()).unwrap();
        assert_eq!(a, b);

        let decrypted = decrypt(&nonce, &a.ciphertext, Some(b"note-17"), dek.as_ref()).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn seeded_rng_gives_reproducible_nonce() {
        let dek = [9u8; KEY_LEN];
        let a = encrypt(&mut StdRng::seed_from_u64(1), b"x", None, &dek).unwrap();
        let b = encrypt(&mut StdRng::seed_from_u64(1), b"x", None, &dek).unwrap();
        assert_eq!(a.nonce, b.nonce);
        assert_eq!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let dek1 = random_dek();
        let dek2 = random_dek();
        let out = encrypt(&mut OsRng, b"secret", None, dek1.as_ref()).unwrap();
        assert_eq!(
            decrypt(&out.nonce, &out.ciphertext, None, dek2.as_ref()),
            Err(CryptoError::AuthenticationFailure)
        );
    }

    #[test]
    fn every_ciphertext_bit_flip_fails_auth() {
        let dek = random_dek();
        let out = encrypt(&mut OsRng, b"tamper me", None, dek.as_ref()).unwrap();
        for bit in 0..out.ciphertext.len() * 8 {
            let mut ct = out.ciphertext.clone();
            ct[bit / 8] ^= 1 << (bit % 8);
            assert_eq!(
                decrypt(&out.nonce, &ct, None, dek.as_ref()),
                Err(CryptoError::AuthenticationFailure),
                "bit {bit} flip went undetected"
            );
        }
    }

    #[test]
    fn every_nonce_bit_flip_fails_auth() {
        let dek = random_dek();
        let out = encrypt(&mut OsRng, b"tamper me", None, dek.as_ref()).unwrap();
        for bit in 0..NONCE_LEN * 8 {
            let mut nonce = out.nonce;
            nonce[bit / 8] ^= 1 << (bit % 8);
            assert_eq!(
                decrypt(&nonce, &out.ciphertext, None, dek.as_ref()),
                Err(CryptoError::AuthenticationFailure)
            );
        }
    }

    #[test]
    fn mismatched_associated_data_fails_auth() {
        let dek = random_dek();
        let out = encrypt(&mut OsRng, b"note", Some(b"record-1"), dek.as_ref()).unwrap();
        assert_eq!(
            decrypt(&out.nonce, &out.ciphertext, Some(b"record-2"), dek.as_ref()),
            Err(CryptoError::AuthenticationFailure)
        );
        assert_eq!(
            decrypt(&out.nonce, &out.ciphertext, None, dek.as_ref()),
            Err(CryptoError::AuthenticationFailure)
        );
    }

    #[test]
    fn absent_and_empty_associated_data_are_identical() {
        let dek = random_dek();
        let nonce = [3u8; NONCE_LEN];
        let absent = encrypt_with_nonce(nonce, b"note", None, dek.as_ref()).unwrap();
        let empty = encrypt_with_nonce(nonce, b"note", Some(b""), dek.as_ref()).unwrap();
        assert_eq!(absent, empty);
        assert!(decrypt(&nonce, &absent.ciphertext, Some(b""), dek.as_ref()).is_ok());
    }

    #[test]
    fn malformed_nonce_or_ciphertext_is_opaque_failure() {
        let dek = random_dek();
        let out = encrypt(&mut OsRng, b"note", None, dek.as_ref()).unwrap();
        assert_eq!(
            decrypt(&out.nonce[..11], &out.ciphertext, None, dek.as_ref()),
            Err(CryptoError::AuthenticationFailure)
        );
        assert_eq!(
            decrypt(&out.nonce, &out.ciphertext[..TAG_LEN - 1], None, dek.as_ref()),
            Err(CryptoError::AuthenticationFailure)
        );
    }

    #[test]
    fn invalid_key_length_rejected() {
        let short_key = [0u8; 16];
        assert_eq!(
            encrypt(&mut OsRng, b"x", None, &short_key),
            Err(CryptoError::InvalidKeyLength(16))
        );
        assert_eq!(
            decrypt(&[0u8; NONCE_LEN], &[0u8; 32], None, &short_key),
            Err(CryptoError::InvalidKeyLength(16))
        );
    }

    #[test]
    fn entropy_failure_surfaces() {
        assert_eq!(
            generate_key(&mut DeadRng).unwrap_err(),
            CryptoError::EntropyFailure
        );
        assert_eq!(
            encrypt(&mut DeadRng, b"x", None, &[0u8; KEY_LEN]),
            Err(CryptoError::EntropyFailure)
        );
    }

    #[test]
    fn ten_thousand_keys_are_unique() {
        let mut seen = HashSet::with_capacity(10_000);
        for _ in 0..10_000 {
            let dek = generate_key(&mut OsRng).unwrap();
            assert!(seen.insert(*dek.as_bytes()), "duplicate DEK generated");
        }
    }

    #[test]
    fn ten_thousand_nonces_are_unique() {
        let dek = random_dek();
        let mut seen = HashSet::with_capacity(10_000);
        for _ in 0..10_000 {
            let out = encrypt(&mut OsRng, b"", None, dek.as_ref()).unwrap();
            assert!(seen.insert(out.nonce), "duplicate nonce generated");
        }
    }
}
