use crate::core::rsvp::{RsvpBoard, RsvpError, RsvpStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// JSON-based RSVP store. The whole map lives in one file:
/// { message_id: { option_key: [mention, ...] } }
pub struct JsonRsvpStore {
    path: PathBuf,
}

impl JsonRsvpStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RsvpStore for JsonRsvpStore {
    async fn load(&self) -> Result<HashMap<u64, RsvpBoard>, RsvpError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let file = File::open(&self.path).map_err(|e| RsvpError::StorageError(e.to_string()))?;
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(boards) => Ok(boards),
            Err(e) => {
                // A broken file should not keep the bot from starting.
                tracing::warn!(
                    "Ignoring unreadable RSVP store at {}: {}",
                    self.path.display(),
                    e
                );
                Ok(HashMap::new())
            }
        }
    }

    async fn save(&self, boards: &HashMap<u64, RsvpBoard>) -> Result<(), RsvpError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RsvpError::StorageError(e.to_string()))?;
        }
        let file = File::create(&self.path).map_err(|e| RsvpError::StorageError(e.to_string()))?;
        serde_json::to_writer_pretty(file, boards)
            .map_err(|e| RsvpError::StorageError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rsvp::default_options;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonRsvpStore::new(dir.path().join("rsvp_responses.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_persistence_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("rsvp_responses.json");
        let store = JsonRsvpStore::new(&path);

        let mut board = RsvpBoard::new(&default_options());
        board.toggle("maybe", "<@42>");
        let mut boards = HashMap::new();
        boards.insert(1234u64, board.clone());
        store.save(&boards).await.unwrap();

        // Reload from file
        let store2 = JsonRsvpStore::new(&path);
        let loaded = store2.load().await.unwrap();
        assert_eq!(loaded.get(&1234), Some(&board));
    }

    #[tokio::test]
    async fn test_file_layout_is_keyed_by_message_id() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rsvp_responses.json");
        let store = JsonRsvpStore::new(&path);

        let mut boards = HashMap::new();
        boards.insert(99u64, RsvpBoard::new(&default_options()));
        store.save(&boards).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["99"]["going"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rsvp_responses.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonRsvpStore::new(&path);
        assert!(store.load().await.unwrap().is_empty());
    }
}
