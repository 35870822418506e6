//! In-memory session records and their thread-safe store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of random bytes in a session token (12 hex chars, 48 bits).
const TOKEN_BYTES: usize = 6;

/// Prefix that makes session tokens self-evident in logs and URLs.
const TOKEN_PREFIX: &str = "sess_";

/// Lifecycle state of a session.
///
/// There is no stored `expired` state: expiry is enforced by removing the
/// record, so an expired session is indistinguishable from one that never
/// existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created, waiting for its one submission.
    Pending,
    /// Submission accepted; further submissions are rejected.
    Filled,
}

/// A single form-filling transaction.
///
/// Field names serialize in camelCase (`createdAt`, `filledAt`) to match the
/// wire format consumed by the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque unique token, e.g. `sess_A1B2C3D4E5F6`.
    pub id: String,
    pub status: SessionStatus,
    /// Submitted payload; `null` until filled.
    pub data: Option<Value>,
    pub created_at: DateTime<Utc>,
    /// Set exactly once, together with the `filled` transition.
    pub filled_at: Option<DateTime<Utc>>,
}

impl Session {
    fn new(id: String) -> Self {
        Self {
            id,
            status: SessionStatus::Pending,
            data: None,
            created_at: Utc::now(),
            filled_at: None,
        }
    }

    /// Check whether the session's age exceeds the given TTL.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        let now = Utc::now();
        if let Ok(age) = (now - self.created_at).to_std() {
            age > ttl
        } else {
            // Negative age means clock skew; treat as fresh.
            false
        }
    }
}

/// Errors surfaced by store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The session ID is not in the live store. Covers never-created,
    /// expired-and-purged, and mistyped IDs alike.
    #[error("session not found or expired")]
    NotFound,

    /// The session was already filled; submissions are accepted exactly once.
    #[error("form already submitted for this session")]
    AlreadyFilled,
}

/// Thread-safe store for sessions.
///
/// All mutations (`create`, `fill`, `sweep`) serialize through a single
/// `RwLock`; check-then-set in [`SessionStore::fill`] happens under one
/// write-lock acquisition, so concurrent fills for the same ID admit exactly
/// one winner.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    sessions: RwLock<HashMap<String, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a new empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Create a new pending session and return a copy of its record.
    #[must_use]
    pub fn create(&self) -> Session {
        let mut guard = self.inner.sessions.write().unwrap();
        let mut id = generate_token();
        // 48 bits of entropy makes a live collision vanishingly unlikely,
        // but regenerating is cheaper than ever overwriting a record.
        while guard.contains_key(&id) {
            id = generate_token();
        }
        let session = Session::new(id.clone());
        guard.insert(id, session.clone());
        session
    }

    /// Get a copy of a session record by ID.
    pub fn get(&self, id: &str) -> Result<Session, SessionError> {
        let guard = self.inner.sessions.read().unwrap();
        guard.get(id).cloned().ok_or(SessionError::NotFound)
    }

    /// Accept the one submission for a session.
    ///
    /// Atomically transitions `pending -> filled`, storing the payload and
    /// the fill timestamp together. Returns the updated record.
    pub fn fill(&self, id: &str, data: Value) -> Result<Session, SessionError> {
        let mut guard = self.inner.sessions.write().unwrap();
        let session = guard.get_mut(id).ok_or(SessionError::NotFound)?;
        if session.status == SessionStatus::Filled {
            return Err(SessionError::AlreadyFilled);
        }
        session.status = SessionStatus::Filled;
        session.data = Some(data);
        session.filled_at = Some(Utc::now());
        Ok(session.clone())
    }

    /// List all live sessions, most recently created first.
    #[must_use]
    pub fn list(&self) -> Vec<Session> {
        let guard = self.inner.sessions.read().unwrap();
        let mut all: Vec<Session> = guard.values().cloned().collect();
        drop(guard);
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Remove every session older than `ttl`, regardless of status.
    ///
    /// Filled sessions expire on the same clock as pending ones; completed
    /// submissions are deliberately not retained past the TTL.
    ///
    /// Returns the number of sessions removed.
    pub fn sweep(&self, ttl: Duration) -> usize {
        let mut guard = self.inner.sessions.write().unwrap();
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired(ttl));
        before - guard.len()
    }

    /// Get the number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }

    /// Check if there are no live sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shift a session's creation time into the past. Test-only.
    #[cfg(test)]
    fn backdate(&self, id: &str, by: Duration) {
        let mut guard = self.inner.sessions.write().unwrap();
        if let Some(session) = guard.get_mut(id) {
            session.created_at -= chrono::Duration::from_std(by).unwrap();
        }
    }
}

/// Generate a fresh session token: `sess_` + 12 uppercase hex chars drawn
/// from the OS CSPRNG.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    format!("{TOKEN_PREFIX}{}", hex::encode_upper(bytes))
}
