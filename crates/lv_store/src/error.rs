use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend I/O failures propagate unchanged from the injected store.
    #[error("Storage backend error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] lv_crypto::CryptoError),

    #[error("No session key: vault is locked or awaiting legacy migration")]
    NoSessionKey,

    #[error("Application data is corrupt or encrypted under a different key: {0}")]
    DataCorrupt(String),

    #[error("Legacy migration failed: {0}")]
    MigrationFailed(String),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
