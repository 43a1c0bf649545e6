//! Active chat session registry.
//!
//! Sessions are keyed by the `x-session-id` header value and dropped after
//! a period of inactivity. Expired sessions are handed back to the caller so
//! their open conversation can be closed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use ambassador_agent::SessionState;

pub type SessionId = String;
pub type SharedSession = Arc<Mutex<SessionState>>;

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// Result of looking up (or minting) the session for a request.
pub struct ResolvedSession {
    pub id: SessionId,
    pub session: SharedSession,
    /// True when the request carried no usable id and a new session was created.
    pub minted: bool,
    /// The session the request asked for, if it had just expired.
    pub expired: Option<SharedSession>,
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    ttl: Duration,
    context_turns: usize,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, context_turns: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            context_turns,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live session and refresh its idle timer, or mint a new one.
    pub async fn resolve(&self, requested: Option<&str>) -> ResolvedSession {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let mut expired = None;

        if let Some(id) = requested.map(str::trim).filter(|id| !id.is_empty()) {
            match sessions.get_mut(id) {
                Some(entry) if now.duration_since(entry.last_seen) <= self.ttl => {
                    entry.last_seen = now;
                    return ResolvedSession {
                        id: id.to_string(),
                        session: entry.session.clone(),
                        minted: false,
                        expired: None,
                    };
                }
                Some(_) => {
                    debug!(session_id = %id, "Session expired");
                    expired = sessions.remove(id).map(|entry| entry.session);
                }
                None => debug!(session_id = %id, "Unknown session id; minting a new one"),
            }
        }

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(SessionState::new(id.clone(), self.context_turns)));
        sessions.insert(id.clone(), SessionEntry { session: session.clone(), last_seen: now });
        ResolvedSession { id, session, minted: true, expired }
    }

    /// Remove every session idle for longer than the TTL and return them.
    pub async fn take_expired(&self) -> Vec<SharedSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let stale: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_seen) > self.ttl)
            .map(|(id, _)| id.clone())
            .collect();
        stale
            .iter()
            .filter_map(|id| sessions.remove(id).map(|entry| entry.session))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
