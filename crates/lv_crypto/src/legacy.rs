//! Legacy XOR cipher, decrypt-only
//!
//! Reproduces the retired scheme older installations used before the
//! AES-GCM format: base64 text, holding the UTF-8 bytes of a string whose
//! UTF-16 code units were XORed against the password's code units,
//! cycling by index modulo the password length.
//!
//! This scheme has NO integrity check. A wrong password produces garbage
//! that only fails once downstream JSON parsing rejects it; the sentinel
//! comparison in the credential store is the only acceptance gate. The
//! encrypt path is permanently retired, so this module exposes decryption
//! only. New data is always written through [`crate::aead`].

use base64::{engine::general_purpose, Engine as _};

use crate::error::CryptoError;

/// Decrypt a legacy blob with the raw password.
///
/// Fails with [`CryptoError::LegacyKeyMissing`] on an empty password and
/// [`CryptoError::Base64Decode`] on undecodable input; otherwise always
/// produces a string, correct or not.
pub fn legacy_decrypt(blob: &str, password: &str) -> Result<String, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::LegacyKeyMissing);
    }
    let raw = general_purpose::STANDARD.decode(blob)?;

    // Binary-to-text shim: the old writer serialised the XORed string as
    // UTF-8 before base64. Lossy so corrupt bytes degrade instead of fail.
    let garbled = String::from_utf8_lossy(&raw);

    let pass_units: Vec<u16> = password.encode_utf16().collect();
    let units: Vec<u16> = garbled
        .encode_utf16()
        .enumerate()
        .map(|(i, unit)| unit ^ pass_units[i % pass_units.len()])
        .collect();

    Ok(String::from_utf16_lossy(&units))
}
