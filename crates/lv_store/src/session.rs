//! Vault session: the in-memory secrets unlocked by a login.
//!
//! One of three states at any time:
//! - `Locked`: nothing held.
//! - `LegacyVerified`: the user proved knowledge of a legacy password but
//!   no modern key exists yet. The plaintext password is retained, only
//!   so the one-time migration can derive a fresh key from it; it is
//!   never persisted or logged, and it is dropped (zeroized) the moment
//!   the session gains a key or is locked.
//! - `Unlocked`: the derived key is held for the life of the process (or
//!   until `lock`).
//!
//! The handle is explicitly scoped: every `Vault` owns its own session,
//! so keys cannot bleed between tests, tabs, or tenants.

use std::sync::Arc;

use tokio::sync::RwLock;
use zeroize::Zeroizing;

use lv_crypto::DerivedKey;

use crate::error::StoreError;

enum SessionState {
    Locked,
    LegacyVerified { password: Zeroizing<String> },
    Unlocked { key: DerivedKey },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Locked,
    LegacyVerified,
    Unlocked,
}

/// Thread-safe session handle. Clone to share with the credential store.
#[derive(Clone)]
pub struct VaultSession {
    inner: Arc<RwLock<SessionState>>,
}

impl VaultSession {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState::Locked)),
        }
    }

    pub async fn status(&self) -> SessionStatus {
        match *self.inner.read().await {
            SessionState::Locked => SessionStatus::Locked,
            SessionState::LegacyVerified { .. } => SessionStatus::LegacyVerified,
            SessionState::Unlocked { .. } => SessionStatus::Unlocked,
        }
    }

    /// Drop all held secrets (zeroized on drop) and return to `Locked`.
    pub async fn lock(&self) {
        *self.inner.write().await = SessionState::Locked;
    }

    pub(crate) async fn set_key(&self, key: DerivedKey) {
        *self.inner.write().await = SessionState::Unlocked { key };
    }

    pub(crate) async fn set_legacy_password(&self, password: &str) {
        *self.inner.write().await = SessionState::LegacyVerified {
            password: Zeroizing::new(password.to_string()),
        };
    }

    /// Clone of the live key, or `NoSessionKey` from `Locked` and
    /// `LegacyVerified`: a legacy session must migrate before it may use
    /// the modern cipher.
    pub(crate) async fn derived_key(&self) -> Result<DerivedKey, StoreError> {
        match &*self.inner.read().await {
            SessionState::Unlocked { key } => Ok(key.clone()),
            _ => Err(StoreError::NoSessionKey),
        }
    }

    pub(crate) async fn legacy_password(&self) -> Option<Zeroizing<String>> {
        match &*self.inner.read().await {
            SessionState::LegacyVerified { password } => Some(password.clone()),
            _ => None,
        }
    }
}

impl Default for VaultSession {
    fn default() -> Self {
        Self::new()
    }
}
