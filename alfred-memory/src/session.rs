//! Within-thread conversation checkpoints.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use alfred_core::Message;

/// State scoped to one conversation thread.
///
/// Holds the message list a session resumes from. Created on the first turn
/// of a session, updated every turn, and never deleted automatically — the
/// caller decides when a session's history is gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// The conversation so far, oldest first.
    pub messages: Vec<Message>,
    /// When the session was first seen.
    pub created_at: DateTime<Utc>,
    /// When the session last changed.
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    fn new() -> Self {
        let now = Utc::now();
        Self { messages: Vec::new(), created_at: now, updated_at: now }
    }
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory checkpoint storage keyed by session id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Checkpoint>>,
}

impl SessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the session's checkpoint; empty for a new session.
    pub async fn checkpoint(&self, session_id: &str) -> Checkpoint {
        self.sessions.read().await.get(session_id).cloned().unwrap_or_default()
    }

    /// Append turns to the session, creating its checkpoint if needed.
    pub async fn append(&self, session_id: &str, turns: &[Message]) {
        let mut sessions = self.sessions.write().await;
        let checkpoint = sessions.entry(session_id.to_string()).or_default();
        checkpoint.messages.extend_from_slice(turns);
        checkpoint.updated_at = Utc::now();
    }

    /// Drop one session's checkpoint.
    pub async fn clear(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }
}
