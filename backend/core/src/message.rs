use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Label used when a turn is rendered into a model prompt.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            TurnRole::User => "USER",
            TurnRole::Assistant => "BOT",
        }
    }
}

/// One entry of a session's conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>, author: Option<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            author,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            author: None,
            timestamp: Utc::now(),
        }
    }

    /// `USER: ...` / `BOT: ...`
    pub fn prompt_line(&self) -> String {
        format!("{}: {}", self.role.prompt_label(), self.text)
    }
}
