use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::{StoreError, StoreResult};
use crate::session::GameSession;

/// Durable storage of serialized sessions, keyed by channel id. Must be
/// atomic per key. The engine treats any failure as fatal for the request;
/// it never reports success while a save failed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, channel: &str) -> StoreResult<Option<GameSession>>;
    async fn save(&self, channel: &str, session: &GameSession) -> StoreResult<()>;
}

/// In-memory store holding each session as a JSON blob, the same logical
/// layout a durable backend would persist. Suitable for tests and
/// single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, channel: &str) -> StoreResult<Option<GameSession>> {
        let sessions = self.sessions.read().await;
        match sessions.get(channel) {
            Some(blob) => {
                let session = serde_json::from_str(blob)
                    .map_err(|e| StoreError::serialization(e.to_string()))?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, channel: &str, session: &GameSession) -> StoreResult<()> {
        let blob = serde_json::to_string(session)
            .map_err(|e| StoreError::serialization(e.to_string()))?;
        let mut sessions = self.sessions.write().await;
        sessions.insert(channel.to_string(), blob);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn session() -> GameSession {
        let mut rng = XorShiftRng::seed_from_u64(9);
        GameSession::new("C42", &["ann".to_string(), "bob".to_string()], &mut rng).unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_through_json() {
        let store = MemoryStore::new();
        let session = session();

        store.save("C42", &session).await.unwrap();
        let loaded = store.load("C42").await.unwrap().unwrap();

        assert_eq!(loaded.channel, session.channel);
        assert_eq!(loaded.turn_index, session.turn_index);
        assert_eq!(loaded.bag.remaining(), session.bag.remaining());
        assert_eq!(loaded.total_tiles(), 100);
        for (a, b) in loaded.players.iter().zip(session.players.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.rack.tiles(), b.rack.tiles());
        }
    }

    #[tokio::test]
    async fn test_load_missing_channel_is_none() {
        let store = MemoryStore::new();
        assert!(store.load("nope").await.unwrap().is_none());
    }
}
