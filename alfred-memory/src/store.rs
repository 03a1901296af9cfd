//! Cross-conversation profile storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::profile::UserProfile;

/// Keyed storage for [`UserProfile`]s, shared across conversations.
///
/// The store outlives any single session. Writes replace the stored record
/// wholesale — last write wins, no field-level merge. Turns for different
/// users touch disjoint keys and are safe to run concurrently; the design
/// assumes no concurrent turns for the same user.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the stored profile, if the user has one.
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Replace the stored profile wholesale.
    async fn put(&self, user_id: &str, profile: UserProfile) -> Result<()>;
}

/// A process-wide in-memory [`ProfileStore`].
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, profile: UserProfile) -> Result<()> {
        self.profiles.write().await.insert(user_id.to_string(), profile);
        Ok(())
    }
}
