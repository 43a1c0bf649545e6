//! Structured logging for the AI Ambassador.
//!
//! Handles log redaction, JSON file output with daily rotation, and
//! conversation event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ConversationEvent, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
