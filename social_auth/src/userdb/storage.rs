use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::errors::UserError;
use super::types::UserRecord;

/// Lookup capability for local user accounts.
///
/// `finder` names a host-defined query scope (the default `all` applies no
/// filter); a scope that excludes the row yields `Ok(None)`, which the
/// orchestrator classifies as a finder failure rather than an error.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64, finder: &str) -> Result<Option<UserRecord>, UserError>;
}

/// In-memory user store with a disabled-set so tests can exercise finder
/// exclusion.
pub struct MemoryUserStore {
    users: Mutex<HashMap<i64, UserRecord>>,
    disabled: Mutex<HashSet<i64>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            disabled: Mutex::new(HashSet::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Insert a new user, assigning the next primary key.
    pub async fn insert(&self, fields: Map<String, Value>) -> UserRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = UserRecord { id, fields };
        self.users.lock().await.insert(id, user.clone());
        user
    }

    /// Store a record under its explicit primary key (fixtures).
    pub async fn put(&self, user: UserRecord) {
        self.users.lock().await.insert(user.id, user);
    }

    /// Mark a user as excluded by every finder other than `all`.
    pub async fn disable(&self, id: i64) {
        self.disabled.lock().await.insert(id);
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: i64, finder: &str) -> Result<Option<UserRecord>, UserError> {
        if finder != "all" && self.disabled.lock().await.contains(&id) {
            return Ok(None);
        }
        Ok(self.users.lock().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryUserStore::new();

        let first = store.insert(Map::new()).await;
        let second = store.insert(Map::new()).await;

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_finder_all_ignores_disabled_flag() {
        // Given a disabled user
        let store = MemoryUserStore::new();
        let user = store.insert(Map::new()).await;
        store.disable(user.id).await;

        // Then the unfiltered finder still returns it
        let found = store.find_by_id(user.id, "all").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_scoped_finder_excludes_disabled_user() {
        // Given a disabled user
        let store = MemoryUserStore::new();
        let user = store
            .insert(Map::from_iter([(
                "email".to_string(),
                json!("ada@example.com"),
            )]))
            .await;
        store.disable(user.id).await;

        // When looking it up through a scoped finder
        let found = store.find_by_id(user.id, "active").await.unwrap();

        // Then the scope excludes the row
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let store = MemoryUserStore::new();
        assert!(store.find_by_id(99, "all").await.unwrap().is_none());
    }
}
