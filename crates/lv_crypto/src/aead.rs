//! Authenticated encryption
//!
//! Uses AES-256-GCM. Key size: 32 bytes. Nonce: 12 bytes (random per
//! call). Tag: 16 bytes.
//!
//! Ciphertext wire format:
//!   [ nonce (12 bytes) | ciphertext + tag ]
//!
//! The store layer base64-encodes this for text-safe persistence.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng as AeadOsRng},
    Aes256Gcm, Nonce,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::kdf::DerivedKey;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key`, prepending a fresh random 12-byte nonce.
///
/// Nonce uniqueness per key comes from the CSPRNG; there is no shared
/// counter, so calls are safe from any thread.
pub fn encrypt(key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::AeadEncrypt)?;

    let nonce = Aes256Gcm::generate_nonce(&mut AeadOsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CryptoError::AeadEncrypt)?;

    // Prepend nonce
    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt wire-format bytes (nonce || ciphertext+tag).
///
/// Fails with [`CryptoError::AeadDecrypt`] on short input, a wrong key, or
/// a tag mismatch. Never returns unauthenticated plaintext.
pub fn decrypt(key: &DerivedKey, data: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::AeadDecrypt);
    }
    let (nonce_bytes, ct) = data.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::AeadDecrypt)?;

    let plaintext = cipher
        .decrypt(nonce, ct)
        .map_err(|_| CryptoError::AeadDecrypt)?;

    Ok(Zeroizing::new(plaintext))
}
