//! Prompt builder.
//!
//! The system prompt carries identity, rules and (for a creator with creator
//! mode on) the JSON action format. The user prompt carries the profile
//! snapshot, recent history and the question.

use ambassador_core::ProfileDocument;

use crate::assistant_identity::AssistantIdentity;
use crate::session_state::SessionState;

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn system_prompt(identity: &AssistantIdentity, session: &SessionState) -> String {
        let update_rule = if session.access.can_mutate() {
            Self::action_instructions()
        } else if session.is_creator() {
            "If the Creator asks to change stored information, explain that creator mode is switched off and must be turned on first. Do not emit any JSON action.".to_string()
        } else {
            "If the user (Guest) asks to 'update', 'add' or 'remove' information, state '⛔ Verification required' and explain that only the Creator can make updates. Do not attempt to update any information.".to_string()
        };

        format!(
            "{identity}\n\n\
             RULES:\n\
             1. For creator info: Use the provided CREATOR INFORMATION to answer questions about {creator}.\n\
             2. {update_rule}\n\
             3. Style: Friendly, concise, and informative.\n\
             4. Respond to questions as {bot}, the assistant, not as the creator.\n\
             5. Do not start your response with a greeting or an introduction of yourself. Answer directly.\n\
             6. Do not copy or reprint the CREATOR INFORMATION JSON. Synthesize it into natural language.\n\
             7. Respond in the language with code '{lang}'.",
            identity = identity.compile(session.is_creator()),
            creator = identity.creator_name,
            bot = identity.bot_name,
            lang = session.language,
        )
    }

    fn action_instructions() -> String {
        [
            "The Creator may ask you to change the stored information. When they do, reply with ONLY a single JSON object and no other text, in one of these forms:",
            r#"   {"action": "update", "field": "<field>", "value": "<new value>"}"#,
            r#"   {"action": "add_item", "field": "<field>", "sub_field": "<category or null>", "item": "<item>"}"#,
            r#"   {"action": "remove_item", "field": "<field>", "sub_field": "<category or null>", "item": "<item>"}"#,
            "   Use sub_field for sections with categories such as Skills. Dates of birth use MM/DD/YYYY. Never change the Creator field. For anything else, answer normally.",
        ]
        .join("\n")
    }

    pub fn user_prompt(profile: &ProfileDocument, session: &SessionState, question: &str) -> String {
        let profile_json = profile.to_pretty_json().unwrap_or_else(|_| "{}".to_string());
        let mut out = format!("CREATOR INFORMATION:\n{profile_json}\n");

        let mut history = session.context.render_for_prompt().peekable();
        if history.peek().is_some() {
            out.push_str(&format!("\nLast {} turns (for context only):", session.context.capacity()));
            for line in history {
                out.push('\n');
                out.push_str(&line);
            }
            out.push('\n');
        }

        out.push_str(&format!("\nUSER QUESTION: {question}"));
        out
    }
}
