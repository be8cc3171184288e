//! In-memory conversation store
//!
//! Maps conversation ids to message histories. Each entry has its own async
//! mutex so a whole turn (read, model calls, commit) holds exclusive access
//! to one conversation while turns on other ids run in parallel. Entries live
//! for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::Message;

type History = Arc<AsyncMutex<Vec<Message>>>;

/// Exclusive handle on one conversation's history
///
/// Dropping the guard releases the conversation for the next turn.
pub type ConversationGuard = OwnedMutexGuard<Vec<Message>>;

/// Keyed store of conversation histories
#[derive(Default)]
pub struct ConversationStore {
    entries: Mutex<HashMap<String, History>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock a conversation, creating an empty one on first reference
    pub async fn lock(&self, id: &str) -> ConversationGuard {
        let entry = {
            let mut entries = self.entries.lock();
            Arc::clone(entries.entry(id.to_string()).or_default())
        };
        entry.lock_owned().await
    }

    /// Copy of a conversation's history, if it exists
    ///
    /// Waits for any turn in progress on that id.
    pub async fn snapshot(&self, id: &str) -> Option<Vec<Message>> {
        let entry = self.entries.lock().get(id).cloned()?;
        let history = entry.lock().await;
        Some(history.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    /// Number of known conversations
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_reference_creates_empty_history() {
        let store = ConversationStore::new();
        assert!(store.snapshot("a").await.is_none());

        {
            let mut history = store.lock("a").await;
            assert!(history.is_empty());
            history.push(Message::user("hello"));
        }

        assert_eq!(store.snapshot("a").await, Some(vec![Message::user("hello")]));
        assert_eq!(store.len(), 1);
        assert!(store.contains("a"));
    }

    #[tokio::test]
    async fn test_same_id_turns_do_not_lose_messages() {
        let store = Arc::new(ConversationStore::new());

        let turns = (0..8).map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut history = store.lock("shared").await;
                let mut working = history.clone();
                tokio::time::sleep(Duration::from_millis(2)).await;
                working.push(Message::user(format!("turn {}", i)));
                *history = working;
            })
        });
        for handle in futures::future::join_all(turns).await {
            handle.unwrap();
        }

        assert_eq!(store.snapshot("shared").await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_different_ids_are_independent() {
        let store = ConversationStore::new();
        let _held = store.lock("a").await;

        let other = tokio::time::timeout(Duration::from_millis(100), store.lock("b")).await;
        assert!(other.is_ok());
        assert_eq!(store.len(), 2);
    }
}
