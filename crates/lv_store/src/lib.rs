//! lv_store — LoreVault encrypted local storage
//!
//! # Encryption strategy
//! The injected key-value backend never sees plaintext application data:
//! - The payload blob and the password verifier are stored as AES-256-GCM
//!   ciphertext, base64-encoded.
//! - The key is derived from the user password via PBKDF2-HMAC-SHA256 and
//!   held in memory only while the session is unlocked.
//! - The 16-byte salt is the one record stored as raw bytes; its presence
//!   is also what marks an account as migrated to the modern format.
//!
//! # Legacy migration
//! Accounts created before the AEAD format carry an XOR-encrypted
//! verifier and no salt. `Vault` verifies those against the legacy
//! cipher, then rewrites salt, verifier, and data under the modern scheme
//! on the first successful data load. `BridgedStore` additionally moves
//! records out of the old flat-file location on first access.

pub mod credentials;
pub mod db;
pub mod error;
pub mod flat;
pub mod kv;
pub mod models;
pub mod session;
pub mod vault;

pub use credentials::CredentialStore;
pub use db::SqliteStore;
pub use error::StoreError;
pub use flat::{FlatFile, FlatStore};
pub use kv::{BridgedStore, KeyValueStore, MemoryStore};
pub use models::AppData;
pub use session::{SessionStatus, VaultSession};
pub use vault::Vault;

#[cfg(test)]
pub(crate) mod testutil {
    use base64::{engine::general_purpose, Engine as _};

    /// Inverse of the retired legacy write path; exists only to seed
    /// fixtures for migration tests.
    pub fn legacy_encrypt_fixture(plaintext: &str, password: &str) -> String {
        let pass_units: Vec<u16> = password.encode_utf16().collect();
        let units: Vec<u16> = plaintext
            .encode_utf16()
            .enumerate()
            .map(|(i, unit)| unit ^ pass_units[i % pass_units.len()])
            .collect();
        let garbled = String::from_utf16(&units).expect("fixture must stay valid UTF-16");
        general_purpose::STANDARD.encode(garbled.as_bytes())
    }
}
