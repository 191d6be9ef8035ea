//! Per-session conversation history.
//!
//! Sessions live in memory, keyed by an opaque [`SessionId`]. The
//! store hands out full histories for prompt assembly and appends a
//! user/assistant pair in one step, so a failed model call never
//! leaves a dangling user turn behind.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use futureme_llm::Message;

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque session identifier.
///
/// Freshly minted ids are UUIDv4 strings, but any non-empty string a
/// client hands back is accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Turns
// ─────────────────────────────────────────────────────────────────────────────

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            at: Utc::now(),
        }
    }

    /// Convert to a chat message for prompt assembly.
    pub fn to_message(&self) -> Message {
        match self.role {
            TurnRole::User => Message::user(&self.content),
            TurnRole::Assistant => Message::assistant(&self.content),
        }
    }
}

#[derive(Debug)]
struct Session {
    turns: Vec<Turn>,
    created_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            turns: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory session store.
///
/// Cheap to clone and safe to share across request handlers.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full history for a session, oldest turn first.
    ///
    /// An unknown id yields an empty history; the session itself is
    /// only materialized on the first append.
    pub async fn history(&self, id: &SessionId) -> Vec<Turn> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(|s| s.turns.clone())
            .unwrap_or_default()
    }

    /// Append a completed user/assistant exchange.
    ///
    /// Both turns land under one write lock, so no observer ever sees
    /// a user turn without its reply.
    pub async fn append_exchange(
        &self,
        id: &SessionId,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id.clone()).or_insert_with(Session::new);
        session.turns.push(Turn::user(user));
        session.turns.push(Turn::assistant(assistant));
        debug!(session = %id, turns = session.turns.len(), "appended exchange");
    }

    /// Number of turns in a session. Unknown ids count zero.
    pub async fn len(&self, id: &SessionId) -> usize {
        let sessions = self.sessions.read().await;
        sessions.get(id).map(|s| s.turns.len()).unwrap_or(0)
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Creation time of a session, if it exists.
    pub async fn created_at(&self, id: &SessionId) -> Option<DateTime<Utc>> {
        let sessions = self.sessions.read().await;
        sessions.get(id).map(|s| s.created_at)
    }
}
