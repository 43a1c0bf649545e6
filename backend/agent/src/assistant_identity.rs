//! Assistant identity.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantIdentity {
    pub bot_name: String,
    pub creator_name: String,
    /// Email that identifies the creator at the login endpoint.
    pub creator_email: String,
}

impl Default for AssistantIdentity {
    fn default() -> Self {
        Self {
            bot_name: "Shrey".into(),
            creator_name: "Shreyash".into(),
            creator_email: String::new(),
        }
    }
}

impl AssistantIdentity {
    pub fn new(bot_name: impl Into<String>, creator_name: impl Into<String>, creator_email: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            creator_name: creator_name.into(),
            creator_email: creator_email.into(),
        }
    }

    pub fn is_creator_email(&self, email: &str) -> bool {
        let configured = self.creator_email.trim();
        !configured.is_empty() && configured.eq_ignore_ascii_case(email.trim())
    }

    /// Compile the identity into the ROLE block of the system prompt.
    pub fn compile(&self, is_creator: bool) -> String {
        format!(
            "ROLE:\n- You are {}, a friendly and personal assistant\n- Your Creator: {}\n- Current user status: {}",
            self.bot_name,
            self.creator_name,
            if is_creator { "Creator" } else { "Guest" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creator_email_match() {
        let id = AssistantIdentity::new("Shrey", "Shreyash", "Owner@Example.com");
        assert!(id.is_creator_email(" owner@example.com "));
        assert!(!id.is_creator_email("guest@example.com"));
        assert!(!AssistantIdentity::default().is_creator_email(""));
    }
}
