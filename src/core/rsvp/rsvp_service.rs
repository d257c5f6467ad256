// RSVP service - keeps every board in memory and persists the whole map
// after each change so buttons keep working after a restart.

use super::rsvp_models::{RsvpBoard, RsvpOption, RsvpToggle};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum RsvpError {
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Unknown RSVP option: {0}")]
    UnknownOption(String),
}

/// Persistence for RSVP boards, keyed by message id.
#[async_trait]
pub trait RsvpStore: Send + Sync {
    async fn load(&self) -> Result<HashMap<u64, RsvpBoard>, RsvpError>;
    async fn save(&self, boards: &HashMap<u64, RsvpBoard>) -> Result<(), RsvpError>;
}

pub struct RsvpService<S: RsvpStore> {
    store: S,
    options: Vec<RsvpOption>,
    boards: RwLock<HashMap<u64, RsvpBoard>>,
}

impl<S: RsvpStore> RsvpService<S> {
    /// Create the service and load previously persisted boards.
    pub async fn new(store: S, options: Vec<RsvpOption>) -> Result<Self, RsvpError> {
        let boards = store.load().await?;
        tracing::debug!("Loaded RSVP store with {} messages", boards.len());

        Ok(Self {
            store,
            options,
            boards: RwLock::new(boards),
        })
    }

    pub fn options(&self) -> &[RsvpOption] {
        &self.options
    }

    /// Start tracking a freshly posted RSVP message.
    pub async fn register(&self, message_id: u64) -> Result<(), RsvpError> {
        let mut boards = self.boards.write().await;
        boards.insert(message_id, RsvpBoard::new(&self.options));
        self.store.save(&boards).await?;
        tracing::debug!(message_id, "RSVP registered");
        Ok(())
    }

    /// Apply a button press by `user_mention` on option `key`.
    ///
    /// Messages we have never seen get a fresh board, so buttons on messages
    /// whose state was lost still work.
    pub async fn respond(
        &self,
        message_id: u64,
        user_mention: &str,
        key: &str,
    ) -> Result<(RsvpToggle, RsvpBoard), RsvpError> {
        if !self.options.iter().any(|opt| opt.key == key) {
            return Err(RsvpError::UnknownOption(key.to_string()));
        }

        // Hold the write lock while saving so snapshots hit disk in order.
        let mut boards = self.boards.write().await;
        let board = boards
            .entry(message_id)
            .or_insert_with(|| RsvpBoard::new(&self.options));
        let toggle = board.toggle(key, user_mention);
        let snapshot = board.clone();

        self.store.save(&boards).await?;
        Ok((toggle, snapshot))
    }

    pub async fn tracked_messages(&self) -> Vec<u64> {
        self.boards.read().await.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rsvp::default_options;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockRsvpStore {
        initial: HashMap<u64, RsvpBoard>,
        saved: Mutex<Vec<HashMap<u64, RsvpBoard>>>,
    }

    #[async_trait]
    impl RsvpStore for MockRsvpStore {
        async fn load(&self) -> Result<HashMap<u64, RsvpBoard>, RsvpError> {
            Ok(self.initial.clone())
        }

        async fn save(&self, boards: &HashMap<u64, RsvpBoard>) -> Result<(), RsvpError> {
            self.saved.lock().unwrap().push(boards.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_register_creates_empty_board_and_persists() {
        let service = RsvpService::new(MockRsvpStore::default(), default_options())
            .await
            .unwrap();
        service.register(100).await.unwrap();

        let saved = service.store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0][&100], RsvpBoard::new(&default_options()));
        drop(saved);
        assert_eq!(service.tracked_messages().await, vec![100]);
    }

    #[tokio::test]
    async fn test_respond_toggles_and_persists_each_change() {
        let service = RsvpService::new(MockRsvpStore::default(), default_options())
            .await
            .unwrap();
        service.register(100).await.unwrap();

        let (toggle, board) = service.respond(100, "<@1>", "going").await.unwrap();
        assert_eq!(
            toggle,
            RsvpToggle::Added {
                key: "going".into()
            }
        );
        assert_eq!(board.responders("going"), ["<@1>"]);

        let (toggle, board) = service.respond(100, "<@1>", "not_going").await.unwrap();
        assert!(matches!(toggle, RsvpToggle::Added { .. }));
        assert!(board.responders("going").is_empty());
        assert_eq!(board.responders("not_going"), ["<@1>"]);

        let (toggle, _) = service.respond(100, "<@1>", "not_going").await.unwrap();
        assert!(matches!(toggle, RsvpToggle::Removed { .. }));

        let saved = service.store.saved.lock().unwrap();
        assert_eq!(saved.len(), 4);
        assert!(saved[3][&100].responders("not_going").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_message_gets_fresh_board() {
        let service = RsvpService::new(MockRsvpStore::default(), default_options())
            .await
            .unwrap();
        let (_, board) = service.respond(555, "<@9>", "maybe").await.unwrap();
        assert_eq!(board.responders("maybe"), ["<@9>"]);
    }

    #[tokio::test]
    async fn test_unknown_option_is_rejected() {
        let service = RsvpService::new(MockRsvpStore::default(), default_options())
            .await
            .unwrap();
        let result = service.respond(100, "<@1>", "definitely").await;
        assert!(matches!(result, Err(RsvpError::UnknownOption(_))));
        assert!(service.store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_boards_survive_reload() {
        let options = default_options();
        let mut board = RsvpBoard::new(&options);
        board.toggle("going", "<@1>");

        let store = MockRsvpStore {
            initial: HashMap::from([(100, board)]),
            ..Default::default()
        };
        let service = RsvpService::new(store, options).await.unwrap();

        let (toggle, board) = service.respond(100, "<@1>", "going").await.unwrap();
        assert!(matches!(toggle, RsvpToggle::Removed { .. }));
        assert!(board.responders("going").is_empty());
    }
}
