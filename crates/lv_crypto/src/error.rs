use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("AEAD encryption failed")]
    AeadEncrypt,

    #[error("AEAD decryption failed (authentication tag mismatch, possible tampering)")]
    AeadDecrypt,

    #[error("Legacy decryption requires a non-empty password")]
    LegacyKeyMissing,

    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}
