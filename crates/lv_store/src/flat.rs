//! Legacy flat-file storage location.
//!
//! Pre-existing installations kept their records in a single flat JSON
//! object (string keys, string values). This module only exists so those
//! records can be moved into the injected key-value store once; it is a
//! migration source, not a general storage backend.

use std::collections::HashMap;
use std::path::PathBuf;

/// Synchronous string-keyed read/remove access to the legacy location.
pub trait FlatStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Flat JSON object file. A missing file is an empty store.
#[derive(Clone)]
pub struct FlatFile {
    path: PathBuf,
}

impl FlatFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> anyhow::Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl FlatStore for FlatFile {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            std::fs::write(&self.path, serde_json::to_string(&map)?)?;
        }
        Ok(())
    }
}
