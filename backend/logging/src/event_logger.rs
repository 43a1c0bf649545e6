//! Conversation Event Logger
//!
//! Structured events (messages, replies, profile mutations, auth attempts,
//! errors) written through `tracing` on the `conversation_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    UserMessage {
        author: String,
        content: String,
    },
    AssistantReply {
        content: String,
        /// `command`, `model` or `fallback`.
        source: String,
    },
    ProfileMutation {
        action: String,
        applied: bool,
        outcome: String,
    },
    AuthAttempt {
        identity: String,
        success: bool,
    },
    Error {
        error_msg: String,
    },
}

impl ConversationEvent {
    fn redact(&mut self) {
        match self {
            ConversationEvent::UserMessage { author, content } => {
                *author = redact_sensitive_data(author);
                *content = redact_sensitive_data(content);
            }
            ConversationEvent::AssistantReply { content, .. } => {
                *content = redact_sensitive_data(content);
            }
            ConversationEvent::ProfileMutation { outcome, .. } => {
                *outcome = redact_sensitive_data(outcome);
            }
            ConversationEvent::AuthAttempt { identity, .. } => {
                *identity = redact_sensitive_data(identity);
            }
            ConversationEvent::Error { error_msg } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ConversationEvent,
}

impl EventLogEntry {
    /// Build a redacted entry.
    pub fn new(session_id: &str, mut event: ConversationEvent) -> Self {
        event.redact();
        Self {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Redact and emit one event.
    pub fn log_event(session_id: &str, event: ConversationEvent) {
        let entry = EventLogEntry::new(session_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "conversation_events", session_id = %entry.session_id, event = %json, "Conversation event");
    }
}
