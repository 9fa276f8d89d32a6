//! lv_crypto — LoreVault cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - Key material is an opaque newtype; callers never see raw bytes.
//!
//! # Module layout
//! - `kdf`    — PBKDF2-HMAC-SHA256 password key derivation + salt generation
//! - `aead`   — AES-256-GCM encrypt/decrypt helpers (nonce || ciphertext+tag)
//! - `legacy` — decrypt-only XOR cipher for pre-AEAD installations
//! - `error`  — unified error type

pub mod aead;
pub mod error;
pub mod kdf;
pub mod legacy;

pub use error::CryptoError;
pub use kdf::DerivedKey;
