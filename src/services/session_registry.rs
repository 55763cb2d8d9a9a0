use crate::error::ApiError;
use crate::services::PreviewSession;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Opaque identifier handed to preview clients
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Random 64-bit id, hex encoded
    pub fn generate() -> Self {
        Self(hex::encode(rand::random::<[u8; 8]>()))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared handle to one session. The lock serialises recomputes per session.
pub type SessionHandle = Arc<Mutex<PreviewSession>>;

/// Trait for preview session storage
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Store a new session and return its id
    async fn insert(&self, session: PreviewSession) -> Result<SessionId, ApiError>;

    /// Find session by id
    async fn get(&self, id: &SessionId) -> Result<Option<SessionHandle>, ApiError>;

    /// Drop a session. Returns false if it did not exist.
    async fn remove(&self, id: &SessionId) -> Result<bool, ApiError>;

    async fn count(&self) -> usize;
}

/// Sessions untouched for this long are dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Open sessions kept before the least recently used one is dropped
pub const DEFAULT_MAX_SESSIONS: usize = 16;

struct Entry {
    handle: SessionHandle,
    last_used: Instant,
}

/// In-memory session storage.
///
/// Each session holds a full decoded image, so the registry is bounded:
/// idle sessions expire and the least recently used one is evicted when the
/// registry is full. Expiry is checked on every access, no background task.
pub struct InMemorySessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, Entry>>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }

    /// A zero `idle_timeout` disables expiry. `max_sessions` below one is
    /// treated as one.
    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    fn expire(&self, sessions: &mut HashMap<SessionId, Entry>, now: Instant) {
        if self.idle_timeout.is_zero() {
            return;
        }
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_used) < self.idle_timeout);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::info!(expired, remaining = sessions.len(), "Expired idle preview sessions");
        }
    }
}

impl Default for InMemorySessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn insert(&self, session: PreviewSession) -> Result<SessionId, ApiError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.expire(&mut sessions, now);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                    tracing::info!(session = %id, "Evicted least recently used preview session");
                }
                None => break,
            }
        }

        let mut id = SessionId::generate();
        while sessions.contains_key(&id) {
            id = SessionId::generate();
        }
        let entry = Entry {
            handle: Arc::new(Mutex::new(session)),
            last_used: now,
        };
        sessions.insert(id.clone(), entry);
        Ok(id)
    }

    async fn get(&self, id: &SessionId) -> Result<Option<SessionHandle>, ApiError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.expire(&mut sessions, now);

        Ok(sessions.get_mut(id).map(|entry| {
            entry.last_used = now;
            entry.handle.clone()
        }))
    }

    async fn remove(&self, id: &SessionId) -> Result<bool, ApiError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(id).is_some())
    }

    async fn count(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.expire(&mut sessions, Instant::now());
        sessions.len()
    }
}
