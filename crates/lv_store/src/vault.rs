//! Vault: login, application-data save/load, and the one-way migration
//! from the legacy XOR format to authenticated encryption.
//!
//! Session lifecycle over a process:
//!   Locked -> login -> Unlocked                    (modern account)
//!   Locked -> login -> LegacyVerified -> load_app_data -> Unlocked
//!
//! A legacy session cannot write: `save_app_data` demands the modern key,
//! which only migration produces. That rules out the half-migrated state
//! where data is legacy-encrypted but the verifier is already modern, or
//! the reverse.

use base64::{engine::general_purpose, Engine as _};

use lv_crypto::{aead, kdf, legacy};

use crate::credentials::{CredentialStore, SALT_KEY, SENTINEL, VERIFIER_KEY};
use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::models::AppData;
use crate::session::{SessionStatus, VaultSession};

pub const DATA_KEY: &str = "vault.app_data";

pub struct Vault<S: KeyValueStore + Clone> {
    store: S,
    creds: CredentialStore<S>,
    session: VaultSession,
}

impl<S: KeyValueStore + Clone> Vault<S> {
    /// Build a vault over an injected store. The session starts `Locked`
    /// and is scoped to this instance; nothing is process-global.
    pub fn new(store: S) -> Self {
        let session = VaultSession::new();
        Self {
            creds: CredentialStore::new(store.clone(), session.clone()),
            store,
            session,
        }
    }

    pub fn session(&self) -> &VaultSession {
        &self.session
    }

    pub fn credentials(&self) -> &CredentialStore<S> {
        &self.creds
    }

    pub async fn has_password(&self) -> Result<bool, StoreError> {
        self.creds.has_password().await
    }

    pub async fn set_password(&self, password: &str) -> Result<(), StoreError> {
        self.creds.set_password(password).await
    }

    /// Returns false on a wrong password. On success the session is
    /// either `Unlocked` (modern account) or `LegacyVerified` (the next
    /// `load_app_data` migrates).
    pub async fn login(&self, password: &str) -> Result<bool, StoreError> {
        self.creds.verify_password(password).await
    }

    /// Serialise, encrypt under the session key, and persist the full
    /// application payload. Requires `Unlocked`; nothing is written
    /// otherwise.
    pub async fn save_app_data(&self, data: &AppData) -> Result<(), StoreError> {
        let key = self.session.derived_key().await?;
        let plain = serde_json::to_vec(data)?;
        let blob = general_purpose::STANDARD.encode(aead::encrypt(&key, &plain)?);
        self.store.put(DATA_KEY, blob.as_bytes()).await?;
        Ok(())
    }

    /// Load (and, for a legacy session, migrate) the application payload.
    ///
    /// A missing record is the first-run case and yields the default
    /// empty payload, not an error.
    pub async fn load_app_data(&self) -> Result<AppData, StoreError> {
        match self.session.status().await {
            SessionStatus::Locked => Err(StoreError::NoSessionKey),
            SessionStatus::Unlocked => self.load_modern().await,
            SessionStatus::LegacyVerified => self.load_legacy_and_migrate().await,
        }
    }

    async fn load_modern(&self) -> Result<AppData, StoreError> {
        let Some(record) = self.store.get(DATA_KEY).await? else {
            return Ok(AppData::default());
        };
        let key = self.session.derived_key().await?;

        // Every failure past this point is corruption (or a foreign key),
        // surfaced as-is. No fallback, no partial result, no auto-wipe.
        let text = std::str::from_utf8(&record)
            .map_err(|e| StoreError::DataCorrupt(format!("blob is not text: {e}")))?;
        let blob = general_purpose::STANDARD
            .decode(text)
            .map_err(|e| StoreError::DataCorrupt(format!("blob is not base64: {e}")))?;
        let plain = aead::decrypt(&key, &blob)
            .map_err(|e| StoreError::DataCorrupt(e.to_string()))?;
        serde_json::from_slice(&plain)
            .map_err(|e| StoreError::DataCorrupt(format!("payload is not valid JSON: {e}")))
    }

    async fn load_legacy_and_migrate(&self) -> Result<AppData, StoreError> {
        let password = self
            .session
            .legacy_password()
            .await
            .ok_or(StoreError::NoSessionKey)?;

        let data = match self.store.get(DATA_KEY).await? {
            // Legacy account that never saved data: migrate an empty
            // payload so the account ends modern and writable.
            None => AppData::default(),
            Some(record) => {
                let text = std::str::from_utf8(&record)
                    .map_err(|e| StoreError::DataCorrupt(format!("blob is not text: {e}")))?;
                let plain = legacy::legacy_decrypt(text, &password)
                    .map_err(|e| StoreError::DataCorrupt(e.to_string()))?;
                // The XOR format has no tag; parsing is the only
                // correctness signal it can give us.
                serde_json::from_str(&plain).map_err(|e| {
                    StoreError::DataCorrupt(format!("legacy payload is not valid JSON: {e}"))
                })?
            }
        };

        self.migrate(&password, &data).await?;
        Ok(data)
    }

    /// Rewrite salt, verifier, and data under the modern scheme, in that
    /// order. The session gains the key only after the last write lands;
    /// any earlier failure keeps the legacy password so the caller can
    /// simply retry the load (legacy decryption is non-destructive).
    async fn migrate(&self, password: &str, data: &AppData) -> Result<(), StoreError> {
        let migration = |e: &dyn std::fmt::Display| StoreError::MigrationFailed(e.to_string());

        let salt = kdf::generate_salt();
        let key = kdf::derive_key(password, &salt).map_err(|e| migration(&e))?;

        let verifier = general_purpose::STANDARD
            .encode(aead::encrypt(&key, SENTINEL.as_bytes()).map_err(|e| migration(&e))?);
        let plain = serde_json::to_vec(data).map_err(|e| migration(&e))?;
        let blob =
            general_purpose::STANDARD.encode(aead::encrypt(&key, &plain).map_err(|e| migration(&e))?);

        self.store
            .put(SALT_KEY, &salt)
            .await
            .map_err(|e| migration(&e))?;
        self.store
            .put(VERIFIER_KEY, verifier.as_bytes())
            .await
            .map_err(|e| migration(&e))?;
        self.store
            .put(DATA_KEY, blob.as_bytes())
            .await
            .map_err(|e| migration(&e))?;

        self.session.set_key(key).await;
        tracing::info!("legacy vault migrated to authenticated encryption");
        Ok(())
    }
}
