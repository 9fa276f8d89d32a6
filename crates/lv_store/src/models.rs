//! The application-data payload the vault protects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything the host application persists, as one blob.
///
/// Item shapes inside each collection are owned by the host; the vault
/// only needs the payload to serialise deterministically. Each field
/// defaults so blobs written by older hosts still parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    /// Character definitions.
    #[serde(default)]
    pub characters: Vec<Value>,
    /// Chat session transcripts.
    #[serde(default)]
    pub sessions: Vec<Value>,
    /// Installed plugin records.
    #[serde(default)]
    pub plugins: Vec<Value>,
    /// Lorebook entries.
    #[serde(default)]
    pub lorebooks: Vec<Value>,
}

impl AppData {
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
            && self.sessions.is_empty()
            && self.plugins.is_empty()
            && self.lorebooks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(AppData::default().is_empty());
    }

    #[test]
    fn missing_collections_parse_as_empty() {
        let data: AppData = serde_json::from_str(r#"{"characters":[{"name":"Ava"}]}"#).unwrap();
        assert_eq!(data.characters.len(), 1);
        assert!(data.sessions.is_empty());
        assert!(data.lorebooks.is_empty());
    }
}
