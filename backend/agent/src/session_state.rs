//! Per-session conversation state.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use ambassador_core::{ConversationTurn, SessionAccess};

use crate::context_window::ConversationContext;

pub const DEFAULT_LANGUAGE: &str = "en";
const GUEST_AUTHOR: &str = "guest";

/// Active state of one browser session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: String,
    /// Email given at login, or the creator name once verified.
    pub author: Option<String>,
    pub access: SessionAccess,
    /// Bounded window fed to the model.
    pub context: ConversationContext,
    /// Everything said in this session, for the history view.
    pub transcript: Vec<ConversationTurn>,
    pub language: String,
    /// Sentiment records are grouped under this id; it rotates at login,
    /// logout and creator-mode toggles.
    pub conversation_id: String,
    pub created_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>, context_turns: usize) -> Self {
        Self {
            session_id: session_id.into(),
            author: None,
            access: SessionAccess::guest(),
            context: ConversationContext::new(context_turns),
            transcript: Vec::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            conversation_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Name used in sentiment records and audit events.
    pub fn actor(&self) -> &str {
        self.author.as_deref().unwrap_or(GUEST_AUTHOR)
    }

    pub fn is_creator(&self) -> bool {
        self.access.creator_logged_in
    }

    /// Append a user/assistant exchange to both the context and transcript.
    pub fn push_exchange(&mut self, user: ConversationTurn, reply: ConversationTurn) {
        self.context.append(user.clone());
        self.context.append(reply.clone());
        self.transcript.push(user);
        self.transcript.push(reply);
    }

    /// Start a new conversation id, returning the one that ended.
    pub fn rotate_conversation(&mut self) -> String {
        std::mem::replace(&mut self.conversation_id, Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_guest() {
        let s = SessionState::new("abc", 6);
        assert_eq!(s.actor(), "guest");
        assert!(!s.is_creator());
        assert_eq!(s.language, "en");
    }

    #[test]
    fn rotation_returns_previous_id() {
        let mut s = SessionState::new("abc", 6);
        let first = s.conversation_id.clone();
        assert_eq!(s.rotate_conversation(), first);
        assert_ne!(s.conversation_id, first);
    }

    #[test]
    fn exchanges_are_bounded_in_context_only() {
        let mut s = SessionState::new("abc", 2);
        for i in 0..3 {
            s.push_exchange(
                ConversationTurn::user(format!("q{i}"), None),
                ConversationTurn::assistant(format!("a{i}")),
            );
        }
        assert_eq!(s.context.len(), 2);
        assert_eq!(s.transcript.len(), 6);
    }
}
