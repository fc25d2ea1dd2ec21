use super::{GameId, GameRecord, GameStore, Identity, StoreError, Unauthorized};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::instrument;

/// An [`Identity`] backed by an in-memory token table.
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    tokens: DashMap<String, String>,
}

impl MemoryIdentity {
    /// Issues a token for an identity, replacing whatever it resolved to before.
    pub fn register(&self, token: impl Into<String>, identity: impl Into<String>) {
        self.tokens.insert(token.into(), identity.into());
    }

    /// Invalidates a token, returning the identity it resolved to.
    pub fn revoke(&self, token: &str) -> Option<String> {
        self.tokens.remove(token).map(|(_, identity)| identity)
    }

    /// Invalidates every token.
    pub fn clear(&self) {
        self.tokens.clear()
    }
}

impl<T: Into<String>, U: Into<String>> FromIterator<(T, U)> for MemoryIdentity {
    fn from_iter<I: IntoIterator<Item = (T, U)>>(iter: I) -> Self {
        let identity = MemoryIdentity::default();
        for (token, who) in iter {
            identity.register(token, who);
        }

        identity
    }
}

#[async_trait]
impl Identity for MemoryIdentity {
    #[instrument(level = "trace", skip(self, token), err)]
    async fn resolve(&self, token: &str) -> Result<String, Unauthorized> {
        match self.tokens.get(token) {
            Some(entry) => Ok(entry.value().clone()),
            None => Err(Unauthorized),
        }
    }
}

/// A [`GameStore`] that keeps every record in memory.
#[derive(Debug)]
pub struct MemoryStore {
    records: DashMap<GameId, GameRecord>,
    next: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore {
            records: DashMap::new(),
            next: AtomicU64::new(1),
        }
    }
}

impl MemoryStore {
    /// Creates a game in the standard initial position under a fresh id.
    #[instrument(level = "debug", skip(self, name), fields(name = %name.as_ref()))]
    pub fn create(&self, name: impl AsRef<str>) -> GameRecord {
        let id = GameId(self.next.fetch_add(1, Ordering::Relaxed));
        let record = GameRecord::new(id, name.as_ref());
        self.records.insert(id, record.clone());
        record
    }

    /// Every stored record, ordered by id.
    pub fn list(&self) -> Vec<GameRecord> {
        let mut records: Vec<_> = self.records.iter().map(|e| e.value().clone()).collect();
        records.sort_by_key(|r| r.game_id);
        records
    }

    /// Deletes every record.
    pub fn clear(&self) {
        self.records.clear()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    #[instrument(level = "trace", skip(self), err)]
    async fn get(&self, id: GameId) -> Result<GameRecord, StoreError> {
        match self.records.get(&id) {
            Some(entry) => Ok(entry.value().clone()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    #[instrument(level = "trace", skip(self, record), fields(id = %record.game_id), err)]
    async fn put(&self, record: GameRecord) -> Result<(), StoreError> {
        self.records.insert(record.game_id, record);
        Ok(())
    }
}
