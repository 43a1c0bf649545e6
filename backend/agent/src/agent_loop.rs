//! Conversation turn loop.
//!
//! Every user message is scored for sentiment, then routed: the explicit
//! chat grammar is handled directly by the command interpreter, everything
//! else goes to the model. A model reply is either text for the user or a
//! JSON action that flows through the same interpreter.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use ambassador_commands::{
    decode_model_output, detect_command, help_text, CommandContext, CommandInterpreter, CommandResponse,
    ModelOutput, ResponseKind, TextCommand,
};
use ambassador_core::{AmbassadorError, ConversationTurn, SessionAccess};
use ambassador_planner::{ModelPlanner, FALLBACK_REPLY};
use ambassador_security::{new_event, AuditLog, CreatorVerifier};
use ambassador_sentiment::SentimentAggregator;
use logging::{ConversationEvent, EventLogger};

use crate::assistant_identity::AssistantIdentity;
use crate::session_state::SessionState;
use crate::system_prompt::PromptBuilder;

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// Deterministic reply from the command grammar or interpreter.
    Command,
    Model,
    /// The model was unreachable.
    Fallback,
}

impl ReplySource {
    fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Command => "command",
            ReplySource::Model => "model",
            ReplySource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub is_creator: bool,
    pub creator_mode: bool,
    pub source: ReplySource,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
    pub is_creator: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatStatus {
    pub is_creator: bool,
    pub creator_mode: bool,
    pub language: String,
    pub author: Option<String>,
}

// ---------------------------------------------------------------------------
// Ambassador
// ---------------------------------------------------------------------------

/// The conversation runtime shared by all sessions.
pub struct Ambassador {
    identity: AssistantIdentity,
    interpreter: Arc<CommandInterpreter>,
    planner: Arc<ModelPlanner>,
    sentiment: Arc<SentimentAggregator>,
    verifier: CreatorVerifier,
    audit: Option<Arc<AuditLog>>,
}

impl Ambassador {
    pub fn new(
        identity: AssistantIdentity,
        interpreter: Arc<CommandInterpreter>,
        planner: Arc<ModelPlanner>,
        sentiment: Arc<SentimentAggregator>,
        verifier: CreatorVerifier,
    ) -> Self {
        Self {
            identity,
            interpreter,
            planner,
            sentiment,
            verifier,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn identity(&self) -> &AssistantIdentity {
        &self.identity
    }

    pub fn interpreter(&self) -> &Arc<CommandInterpreter> {
        &self.interpreter
    }

    pub fn sentiment(&self) -> &Arc<SentimentAggregator> {
        &self.sentiment
    }

    pub fn planner(&self) -> &Arc<ModelPlanner> {
        &self.planner
    }

    // -- Turn handling ------------------------------------------------------

    #[instrument(skip(self, session, input), fields(session_id = %session.session_id))]
    pub async fn submit_message(&self, session: &mut SessionState, input: &str) -> ChatReply {
        let input = input.trim();
        let command = detect_command(input, &self.identity.creator_name);

        // The password never reaches logs, history or the sentiment store.
        let recorded = match &command {
            Some(TextCommand::Login { .. }) => format!("I am {} ****", self.identity.creator_name),
            _ => input.to_string(),
        };
        let author_at_submit = session.author.clone();

        EventLogger::log_event(
            &session.session_id,
            ConversationEvent::UserMessage { author: session.actor().to_string(), content: recorded.clone() },
        );
        self.sentiment.record(session.actor(), &session.conversation_id, &recorded).await;

        let is_logout = matches!(command, Some(TextCommand::Logout));
        let (response, source) = match command {
            _ if input.is_empty() => (self.say("Please type a message."), ReplySource::Command),
            Some(TextCommand::Login { password }) => (self.login_with_password(session, &password).await, ReplySource::Command),
            Some(TextCommand::LoginUsage) => (
                format!("To log in as Creator, please type 'I am {} [your_password]'.", self.identity.creator_name),
                ReplySource::Command,
            ),
            Some(TextCommand::Logout) => (self.logout(session).await, ReplySource::Command),
            Some(TextCommand::Help) => (
                help_text(&self.identity.bot_name, &self.identity.creator_name),
                ReplySource::Command,
            ),
            Some(TextCommand::Mutation(parsed)) => {
                let ctx = Self::command_context(session);
                let resp = self.interpreter.execute_parsed(&ctx, &parsed).await;
                let action = parsed.as_ref().map(|a| a.kind().as_str()).unwrap_or("invalid");
                self.log_mutation(session, action, &resp);
                (resp.text, ReplySource::Command)
            }
            None => self.ask_model(session, input).await,
        };

        EventLogger::log_event(
            &session.session_id,
            ConversationEvent::AssistantReply { content: response.clone(), source: source.as_str().to_string() },
        );

        if !is_logout {
            session.push_exchange(
                ConversationTurn::user(recorded, author_at_submit),
                ConversationTurn::assistant(response.clone()),
            );
        }

        ChatReply {
            response,
            is_creator: session.access.creator_logged_in,
            creator_mode: session.access.creator_mode_active,
            source,
        }
    }

    async fn ask_model(&self, session: &SessionState, input: &str) -> (String, ReplySource) {
        let profile = self.interpreter.snapshot().await;
        let system = PromptBuilder::system_prompt(&self.identity, session);
        let user = PromptBuilder::user_prompt(&profile, session, input);

        let raw = self.planner.respond(&system, &user).await;
        if raw == FALLBACK_REPLY {
            return (raw, ReplySource::Fallback);
        }

        let ctx = Self::command_context(session);
        match decode_model_output(&raw) {
            ModelOutput::Text(text) => (text, ReplySource::Model),
            ModelOutput::Action(action) => {
                info!(action = action.kind().as_str(), "Model proposed a profile action");
                let resp = self.interpreter.execute(&ctx, &action).await;
                self.log_mutation(session, action.kind().as_str(), &resp);
                (resp.text, ReplySource::Command)
            }
            ModelOutput::Invalid(err) => {
                let resp = self.interpreter.reject_invalid(&ctx, &err).await;
                self.log_mutation(session, "invalid", &resp);
                (resp.text, ReplySource::Command)
            }
        }
    }

    // -- Authentication -----------------------------------------------------

    /// Login endpoint: the creator email needs a verifying password; any
    /// other email starts a guest session under that identity.
    #[instrument(skip(self, session, password), fields(session_id = %session.session_id))]
    pub async fn authenticate(&self, session: &mut SessionState, email: &str, password: Option<&str>) -> AuthOutcome {
        let email = email.trim();
        if email.is_empty() {
            return AuthOutcome {
                success: false,
                message: "Please enter an email address.".into(),
                is_creator: session.is_creator(),
            };
        }

        if self.identity.is_creator_email(email) {
            let verified = password
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .is_some_and(|p| self.verifier.verify(p));
            let message = if verified {
                self.begin_creator_session(session).await;
                format!("🔓 Verified! Creator privileges activated. Welcome, {}.", self.identity.creator_name)
            } else {
                session.access = SessionAccess::guest();
                "⚠️ Authentication failed. Incorrect password.".to_string()
            };
            self.record_auth(session, email, verified, &message).await;
            return AuthOutcome { success: verified, message, is_creator: verified };
        }

        if session.author.as_deref() != Some(email) || session.is_creator() {
            self.close_conversation(session).await;
        }
        session.access = SessionAccess::guest();
        session.author = Some(email.to_string());
        let message = format!("Welcome! Ask me anything about {}.", self.identity.creator_name);
        self.record_auth(session, email, true, &message).await;
        AuthOutcome { success: true, message, is_creator: false }
    }

    async fn login_with_password(&self, session: &mut SessionState, password: &str) -> String {
        let verified = self.verifier.verify(password);
        let message = if verified {
            self.begin_creator_session(session).await;
            format!("🔓 Verified! Creator privileges activated. Welcome, {}.", self.identity.creator_name)
        } else {
            session.access = SessionAccess::guest();
            "⚠️ Authentication failed. Incorrect password.".to_string()
        };
        let identity = self.identity.creator_name.clone();
        self.record_auth(session, &identity, verified, &message).await;
        message
    }

    async fn begin_creator_session(&self, session: &mut SessionState) {
        self.close_conversation(session).await;
        session.access = SessionAccess::creator();
        session.author = Some(self.identity.creator_name.clone());
        info!(session_id = %session.session_id, "Creator verified");
    }

    pub async fn logout(&self, session: &mut SessionState) -> String {
        self.close_conversation(session).await;
        session.access = SessionAccess::guest();
        session.author = None;
        session.context.clear();
        session.transcript.clear();
        info!(session_id = %session.session_id, "Session logged out");
        "👋 You have been logged out. Chat history cleared.".to_string()
    }

    /// Flip creator mode for a verified creator. Returns the new state.
    pub async fn toggle_creator_mode(&self, session: &mut SessionState) -> Result<bool, AmbassadorError> {
        if !session.is_creator() {
            warn!(session_id = %session.session_id, "Creator mode toggle refused for unverified session");
            return Err(AmbassadorError::VerificationRequired);
        }
        self.close_conversation(session).await;
        let active = session.access.toggle_creator_mode();
        info!(session_id = %session.session_id, active, "Creator mode toggled");
        Ok(active)
    }

    // -- Session settings ---------------------------------------------------

    /// Accepts `xx` or `xx-YY`, normalizing the case of each part.
    pub fn set_language(&self, session: &mut SessionState, code: &str) -> Result<String, AmbassadorError> {
        let normalized = normalize_language(code).ok_or_else(|| AmbassadorError::InvalidLanguage(code.trim().to_string()))?;
        session.language = normalized.clone();
        Ok(normalized)
    }

    pub fn history(&self, session: &SessionState) -> Vec<ConversationTurn> {
        session.transcript.clone()
    }

    pub fn status(&self, session: &SessionState) -> ChatStatus {
        ChatStatus {
            is_creator: session.access.creator_logged_in,
            creator_mode: session.access.creator_mode_active,
            language: session.language.clone(),
            author: session.author.clone(),
        }
    }

    /// End the session's conversation, e.g. when it expires.
    pub async fn close_conversation(&self, session: &mut SessionState) {
        let ended = session.rotate_conversation();
        self.sentiment.close_conversation(&ended, session.actor()).await;
    }

    // -- Helpers ------------------------------------------------------------

    fn command_context(session: &SessionState) -> CommandContext {
        CommandContext {
            session_id: session.session_id.clone(),
            actor: session.actor().to_string(),
            access: session.access,
        }
    }

    fn say(&self, message: &str) -> String {
        format!("{}: {}", self.identity.bot_name, message)
    }

    fn log_mutation(&self, session: &SessionState, action: &str, resp: &CommandResponse) {
        for event in mutation_events(action, resp) {
            EventLogger::log_event(&session.session_id, event);
        }
    }

    async fn record_auth(&self, session: &SessionState, identity: &str, success: bool, message: &str) {
        EventLogger::log_event(
            &session.session_id,
            ConversationEvent::AuthAttempt { identity: identity.to_string(), success },
        );
        let Some(audit) = &self.audit else { return };
        let mut event = new_event(&session.session_id, session.actor(), "login");
        event.applied = success;
        event.outcome = message.to_string();
        event.detail = serde_json::json!({ "identity": identity });
        if let Err(e) = audit.record(event).await {
            warn!(error = %e, "Failed to audit login attempt");
        }
    }
}

fn normalize_language(code: &str) -> Option<String> {
    let code = code.trim();
    let (lang, region) = match code.split_once(['-', '_']) {
        Some((lang, region)) => (lang, Some(region)),
        None => (code, None),
    };
    let alpha2 = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_alphabetic());
    if !alpha2(lang) || !region.is_none_or(alpha2) {
        return None;
    }
    let mut out = lang.to_ascii_lowercase();
    if let Some(region) = region {
        out.push('-');
        out.push_str(&region.to_ascii_uppercase());
    }
    Some(out)
}

/// Events for one mutation attempt. A failed save is also an error event.
fn mutation_events(action: &str, resp: &CommandResponse) -> Vec<ConversationEvent> {
    let mut events = vec![ConversationEvent::ProfileMutation {
        action: action.to_string(),
        applied: matches!(resp.kind, ResponseKind::Applied | ResponseKind::PersistFailed),
        outcome: resp.text.clone(),
    }];
    if resp.kind == ResponseKind::PersistFailed {
        events.push(ConversationEvent::Error { error_msg: format!("profile save failed after {action}") });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambassador_core::{ProfileValue, SentimentLabel};
    use ambassador_planner::{MockProvider, ModelSettings};
    use ambassador_profile::ProfileStore;
    use ambassador_security::hash_password;
    use ambassador_sentiment::{FixedClassifier, SentimentStore};

    struct Harness {
        ambassador: Ambassador,
        mock: Arc<MockProvider>,
        classifier: Arc<FixedClassifier>,
        audit: Arc<AuditLog>,
        _dir: tempfile::TempDir,
    }

    async fn harness(model_reply: &str) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let password_file = dir.path().join("creator_password.hash");
        std::fs::write(&password_file, hash_password("s3cret")).unwrap();

        let store = ProfileStore::new(dir.path().join("my_info.json"), "Shreyash");
        let interpreter = Arc::new(CommandInterpreter::open(store, "Shrey").await);
        let mock = Arc::new(MockProvider::new("mock").with_response(model_reply));
        let planner = Arc::new(ModelPlanner::new(Some(mock.clone()), ModelSettings::default()));
        let classifier = Arc::new(FixedClassifier::new(SentimentLabel::Positive, 0.9));
        let sentiment = Arc::new(SentimentAggregator::new(classifier.clone(), SentimentStore::in_memory().unwrap()));
        let audit = Arc::new(AuditLog::in_memory().unwrap());

        let ambassador = Ambassador::new(
            AssistantIdentity::new("Shrey", "Shreyash", "owner@example.com"),
            interpreter,
            planner,
            sentiment,
            CreatorVerifier::new(password_file),
        )
        .with_audit(audit.clone());

        Harness { ambassador, mock, classifier, audit, _dir: dir }
    }

    #[tokio::test]
    async fn guest_question_goes_to_model() {
        let h = harness("He enjoys swimming and sketching.").await;
        let mut session = SessionState::new("s1", 6);

        let reply = h.ambassador.submit_message(&mut session, "What are his hobbies?").await;
        assert_eq!(reply.response, "He enjoys swimming and sketching.");
        assert_eq!(reply.source, ReplySource::Model);
        assert!(!reply.is_creator);

        let sent = h.mock.requests().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].user_prompt.ends_with("USER QUESTION: What are his hobbies?"));
        assert!(sent[0].system_prompt.contains("Current user status: Guest"));
        assert_eq!(session.context.len(), 2);
        assert_eq!(h.classifier.calls(), 1);
    }

    #[tokio::test]
    async fn text_login_then_explicit_add() {
        let h = harness("unused").await;
        let mut session = SessionState::new("s1", 6);

        let reply = h.ambassador.submit_message(&mut session, "I am Shreyash s3cret").await;
        assert!(reply.is_creator && reply.creator_mode);
        assert!(reply.response.starts_with("🔓 Verified!"));
        assert!(session.transcript.iter().all(|t| !t.text.contains("s3cret")));

        let reply = h.ambassador.submit_message(&mut session, "add chess to hobbies").await;
        assert_eq!(reply.response, "Shrey: Added 'chess' to 'Hobbies'.");
        assert_eq!(h.mock.call_count().await, 0);

        let doc = h.ambassador.interpreter().snapshot().await;
        assert!(doc.get("Hobbies").and_then(ProfileValue::as_list).unwrap().contains(&"chess".to_string()));
    }

    #[tokio::test]
    async fn wrong_password_fails_closed() {
        let h = harness("unused").await;
        let mut session = SessionState::new("s1", 6);
        let reply = h.ambassador.submit_message(&mut session, "I am Shreyash wrong").await;
        assert_eq!(reply.response, "⚠️ Authentication failed. Incorrect password.");
        assert!(!reply.is_creator);

        let events = h.audit.recent(5).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "login");
        assert!(!events[0].applied);
    }

    #[tokio::test]
    async fn guest_explicit_add_is_refused() {
        let h = harness("unused").await;
        let mut session = SessionState::new("s1", 6);
        let before = h.ambassador.interpreter().snapshot().await;

        let reply = h.ambassador.submit_message(&mut session, "add chess to hobbies").await;
        assert_eq!(reply.response, "Shrey: ⛔ Creator verification required to add information.");
        assert_eq!(h.ambassador.interpreter().snapshot().await, before);
    }

    #[tokio::test]
    async fn model_action_is_applied_in_creator_mode() {
        let h = harness(r#"{"action": "update", "field": "occupation", "value": "Engineer"}"#).await;
        let mut session = SessionState::new("s1", 6);
        h.ambassador.submit_message(&mut session, "I am Shreyash s3cret").await;

        let reply = h.ambassador.submit_message(&mut session, "I work as an engineer now").await;
        assert_eq!(reply.source, ReplySource::Command);
        assert!(reply.response.starts_with("Shrey: Changed 'Occupation' from '"));
        assert!(reply.response.ends_with("to 'Engineer'."));
        // The confirmation, not the raw JSON, enters the context.
        assert!(session.context.turns().all(|t| !t.text.contains("\"action\"")));
    }

    #[tokio::test]
    async fn malformed_model_action_is_reported() {
        let h = harness(r#"{"action": "add_item", "field": "Hobbies"}"#).await;
        let mut session = SessionState::new("s1", 6);
        session.access = SessionAccess::creator();
        let reply = h.ambassador.submit_message(&mut session, "add something").await;
        assert!(reply.response.starts_with("Shrey: I couldn't understand that add request"));
    }

    #[tokio::test]
    async fn authenticate_by_email() {
        let h = harness("unused").await;
        let mut session = SessionState::new("s1", 6);

        let out = h.ambassador.authenticate(&mut session, "OWNER@example.com", None).await;
        assert!(!out.success && !out.is_creator);

        let out = h.ambassador.authenticate(&mut session, "owner@example.com", Some("s3cret")).await;
        assert!(out.success && out.is_creator);
        assert_eq!(session.actor(), "Shreyash");

        let mut guest = SessionState::new("s2", 6);
        let out = h.ambassador.authenticate(&mut guest, "visitor@example.com", Some("ignored")).await;
        assert!(out.success && !out.is_creator);
        assert_eq!(guest.actor(), "visitor@example.com");
        assert!(!guest.access.can_mutate());
    }

    #[tokio::test]
    async fn creator_mode_toggle() {
        let h = harness("unused").await;
        let mut session = SessionState::new("s1", 6);
        assert!(matches!(
            h.ambassador.toggle_creator_mode(&mut session).await,
            Err(AmbassadorError::VerificationRequired)
        ));

        h.ambassador.authenticate(&mut session, "owner@example.com", Some("s3cret")).await;
        assert_eq!(h.ambassador.toggle_creator_mode(&mut session).await.unwrap(), false);
        let reply = h.ambassador.submit_message(&mut session, "remove skating from hobbies").await;
        assert_eq!(reply.response, "Shrey: ⛔ Creator verification required to remove information.");
    }

    #[tokio::test]
    async fn language_codes() {
        let h = harness("ok").await;
        let mut session = SessionState::new("s1", 6);
        assert_eq!(h.ambassador.set_language(&mut session, "PT-br").unwrap(), "pt-BR");
        assert_eq!(session.language, "pt-BR");
        assert!(h.ambassador.set_language(&mut session, "english").is_err());
        assert!(h.ambassador.set_language(&mut session, "e1").is_err());
        assert_eq!(session.language, "pt-BR");

        h.ambassador.submit_message(&mut session, "hello").await;
        assert!(h.mock.requests().await[0].system_prompt.contains("'pt-BR'"));
    }

    #[tokio::test]
    async fn logout_clears_history_and_closes_conversation() {
        let h = harness("Sure.").await;
        let mut session = SessionState::new("s1", 6);
        h.ambassador.submit_message(&mut session, "hello").await;
        let conversation = session.conversation_id.clone();

        let reply = h.ambassador.submit_message(&mut session, "logout").await;
        assert_eq!(reply.response, "👋 You have been logged out. Chat history cleared.");
        assert!(session.context.is_empty());
        assert!(h.ambassador.history(&session).is_empty());
        assert_ne!(session.conversation_id, conversation);

        let summaries = h.ambassador.sentiment().conversation_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].conversation_id, conversation);
    }

    #[tokio::test]
    async fn empty_message_skips_model_and_classifier() {
        let h = harness("unused").await;
        let mut session = SessionState::new("s1", 6);
        let reply = h.ambassador.submit_message(&mut session, "   ").await;
        assert_eq!(reply.response, "Shrey: Please type a message.");
        assert_eq!(h.mock.call_count().await, 0);
        assert_eq!(h.classifier.calls(), 0);
    }

    #[tokio::test]
    async fn failing_model_returns_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("my_info.json"), "Shreyash");
        let ambassador = Ambassador::new(
            AssistantIdentity::default(),
            Arc::new(CommandInterpreter::open(store, "Shrey").await),
            Arc::new(ModelPlanner::new(Some(Arc::new(MockProvider::new("m").failing())), ModelSettings::default())),
            Arc::new(SentimentAggregator::new(
                Arc::new(FixedClassifier::new(SentimentLabel::Neutral, 0.5)),
                SentimentStore::in_memory().unwrap(),
            )),
            CreatorVerifier::new(dir.path().join("missing.hash")),
        );
        let mut session = SessionState::new("s1", 6);
        let reply = ambassador.submit_message(&mut session, "hi").await;
        assert_eq!(reply.source, ReplySource::Fallback);
        assert_eq!(reply.response, FALLBACK_REPLY);
    }

    #[test]
    fn language_normalization() {
        assert_eq!(normalize_language("en").as_deref(), Some("en"));
        assert_eq!(normalize_language("en_us").as_deref(), Some("en-US"));
        assert_eq!(normalize_language("eng"), None);
        assert_eq!(normalize_language("en-USA"), None);
    }

    #[test]
    fn failed_save_adds_an_error_event() {
        let resp = CommandResponse { text: "Error saving the change".into(), kind: ResponseKind::PersistFailed };
        let events = mutation_events("add_item", &resp);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], ConversationEvent::ProfileMutation { applied: true, .. }));
        assert!(matches!(&events[1], ConversationEvent::Error { error_msg } if error_msg.contains("add_item")));

        let resp = CommandResponse { text: "Added".into(), kind: ResponseKind::Applied };
        assert_eq!(mutation_events("add_item", &resp).len(), 1);
    }
}
