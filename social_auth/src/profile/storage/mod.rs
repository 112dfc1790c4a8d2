use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::errors::ProfileError;
use super::types::SocialProfile;

mod sqlite;

pub use sqlite::SqliteProfileStore;

/// Persistence capability for social profiles.
///
/// The store is the authoritative race-breaker for concurrent first logins:
/// `save` of a second row with an already-stored `(provider, identifier)`
/// key must fail with [`ProfileError::Duplicate`], never insert.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Exact-match lookup by natural key.
    async fn find_by_provider(
        &self,
        provider: &str,
        identifier: &str,
    ) -> Result<Option<SocialProfile>, ProfileError>;

    /// Insert (no surrogate key yet) or update a profile.
    ///
    /// Returns the stored row: inserts get their surrogate key assigned,
    /// updates get `updated_at` bumped.
    async fn save(&self, profile: SocialProfile) -> Result<SocialProfile, ProfileError>;
}

/// Mutex-guarded map store, used in tests and short-lived embeddings.
pub struct MemoryProfileStore {
    rows: Mutex<HashMap<(String, String), SocialProfile>>,
    next_id: AtomicI64,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored profiles.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find_by_provider(
        &self,
        provider: &str,
        identifier: &str,
    ) -> Result<Option<SocialProfile>, ProfileError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .get(&(provider.to_string(), identifier.to_string()))
            .cloned())
    }

    async fn save(&self, mut profile: SocialProfile) -> Result<SocialProfile, ProfileError> {
        let mut rows = self.rows.lock().await;
        let key = (profile.provider.clone(), profile.identifier.clone());

        if profile.id.is_none() {
            if rows.contains_key(&key) {
                return Err(ProfileError::Duplicate {
                    provider: profile.provider,
                    identifier: profile.identifier,
                });
            }
            profile.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
        }

        profile.updated_at = Utc::now();
        rows.insert(key, profile.clone());
        Ok(profile)
    }
}
