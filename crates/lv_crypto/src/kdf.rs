//! Password key derivation
//!
//! `derive_key` turns (password, salt) into the 32-byte key that encrypts
//! all locally persisted application data. PBKDF2-HMAC-SHA256 with a fixed
//! iteration count: the count is part of the stored-blob format, so
//! lowering it is a format change, not a tuning knob.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;

pub const SALT_LEN: usize = 16;
pub const KDF_ITERATIONS: u32 = 100_000;
pub const DERIVED_KEY_LEN: usize = 32;

/// 32-byte symmetric key derived from the user password. Zeroized on drop.
///
/// The raw bytes are only reachable from inside this crate; callers hand
/// the key to [`crate::aead`] and never see the material itself.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey([u8; DERIVED_KEY_LEN]);

impl DerivedKey {
    pub(crate) fn as_bytes(&self) -> &[u8; DERIVED_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derive a key from a user password + 16-byte salt.
/// The salt is stored alongside the encrypted data (not secret).
///
/// Deterministic and CPU-bound. The cost is deliberate (brute-force
/// resistance); expect hundreds of milliseconds, not a hang.
pub fn derive_key(password: &str, salt: &[u8]) -> Result<DerivedKey, CryptoError> {
    if salt.len() != SALT_LEN {
        return Err(CryptoError::InvalidInput(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    let mut output = [0u8; DERIVED_KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, KDF_ITERATIONS, &mut output);
    Ok(DerivedKey(output))
}

/// Generate a fresh random 16-byte salt (call once per password-set event;
/// persist next to the verifier).
pub fn generate_salt() -> [u8; SALT_LEN] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}
