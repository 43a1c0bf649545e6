/// Command interpreter: authorization gate, apply, persist, respond.
///
/// Owns the process-wide profile document. Mutations hold the write lock
/// across apply and save, so concurrent creator sessions serialize.
use std::sync::Arc;

use ambassador_core::{ProfileDocument, SessionAccess};
use ambassador_profile::ProfileStore;
use ambassador_security::{new_event, AuditLog};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::interpreter::apply;
use crate::schema::ActionError;
use crate::types::{Action, ActionKind, ParsedAction};

// ---------------------------------------------------------------------------
// Context / response
// ---------------------------------------------------------------------------

/// Who is asking, passed with every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub session_id: String,
    pub actor: String,
    pub access: SessionAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Document changed and was saved.
    Applied,
    /// Valid action that changed nothing (duplicate add, missing remove, ...).
    Informational,
    /// Authorization gate said no.
    Refused,
    /// Validation or usage error.
    Invalid,
    /// Document changed in memory but the write failed.
    PersistFailed,
}

/// The deterministic reply for one command. `text` is what the user sees
/// and what enters the conversation context.
#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub text: String,
    pub kind: ResponseKind,
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

pub struct CommandInterpreter {
    store: ProfileStore,
    document: RwLock<ProfileDocument>,
    bot_name: String,
    audit: Option<Arc<AuditLog>>,
}

impl CommandInterpreter {
    /// Load the document through the store (degrading to the default).
    pub async fn open(store: ProfileStore, bot_name: impl Into<String>) -> Self {
        let document = store.load().await;
        Self::with_document(store, document, bot_name)
    }

    pub fn with_document(store: ProfileStore, document: ProfileDocument, bot_name: impl Into<String>) -> Self {
        Self {
            store,
            document: RwLock::new(document),
            bot_name: bot_name.into(),
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Copy of the current document, for prompts and read-only views.
    pub async fn snapshot(&self) -> ProfileDocument {
        self.document.read().await.clone()
    }

    /// Run a text-grammar command, which may be a usage error.
    pub async fn execute_parsed(&self, ctx: &CommandContext, parsed: &ParsedAction) -> CommandResponse {
        match parsed {
            Ok(action) => self.execute(ctx, action).await,
            Err(usage) => {
                if let Some(refusal) = self.gate(ctx, usage.kind) {
                    return refusal;
                }
                self.reply(usage.hint.to_string(), ResponseKind::Invalid)
            }
        }
    }

    /// Report a model-emitted action that could not be decoded.
    pub async fn reject_invalid(&self, ctx: &CommandContext, err: &ActionError) -> CommandResponse {
        warn!(session_id = %ctx.session_id, error = %err, "Model emitted an unusable action");
        self.reply(err.to_string(), ResponseKind::Invalid)
    }

    #[instrument(skip(self, ctx), fields(session_id = %ctx.session_id, action = action.kind().as_str()))]
    pub async fn execute(&self, ctx: &CommandContext, action: &Action) -> CommandResponse {
        let response = match self.gate(ctx, action.kind()) {
            Some(refusal) => refusal,
            None => self.apply_and_save(action).await,
        };
        self.audit(ctx, action, &response).await;
        response
    }

    fn gate(&self, ctx: &CommandContext, kind: ActionKind) -> Option<CommandResponse> {
        if ctx.access.can_mutate() {
            return None;
        }
        info!(session_id = %ctx.session_id, actor = %ctx.actor, "Mutation refused: creator verification required");
        Some(self.reply(
            format!("⛔ Creator verification required to {} information.", kind.verb()),
            ResponseKind::Refused,
        ))
    }

    async fn apply_and_save(&self, action: &Action) -> CommandResponse {
        let mut doc = self.document.write().await;
        let outcome = match apply(&mut doc, action) {
            Ok(outcome) => outcome,
            Err(e) => return self.reply(e.to_string(), ResponseKind::Invalid),
        };
        if !outcome.is_mutation() {
            return self.reply(outcome.describe(), ResponseKind::Informational);
        }

        // The in-memory change stays even if the write fails.
        match self.store.save(&mut doc).await {
            Ok(()) => {
                info!(target = %outcome.target(), "Profile updated");
                self.reply(outcome.describe(), ResponseKind::Applied)
            }
            Err(e) => {
                error!(error = %e, target = %outcome.target(), "Failed to persist profile change");
                self.reply(
                    format!(
                        "Error saving the change to '{}'. It is active for now but may be lost on restart.",
                        outcome.target()
                    ),
                    ResponseKind::PersistFailed,
                )
            }
        }
    }

    async fn audit(&self, ctx: &CommandContext, action: &Action, response: &CommandResponse) {
        let Some(audit) = &self.audit else { return };
        let mut event = new_event(&ctx.session_id, &ctx.actor, action.kind().as_str());
        event.applied = matches!(response.kind, ResponseKind::Applied | ResponseKind::PersistFailed);
        event.outcome = response.text.clone();
        event.detail = serde_json::to_value(action).unwrap_or_default();
        if let Err(e) = audit.record(event).await {
            error!(error = %e, "Failed to write audit event");
        }
    }

    fn reply(&self, message: String, kind: ResponseKind) -> CommandResponse {
        CommandResponse { text: format!("{}: {}", self.bot_name, message), kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommandUsage;
    use ambassador_core::ProfileValue;

    fn creator_ctx() -> CommandContext {
        CommandContext {
            session_id: "s1".into(),
            actor: "Shreyash".into(),
            access: SessionAccess::creator(),
        }
    }

    fn guest_ctx() -> CommandContext {
        CommandContext {
            session_id: "s2".into(),
            actor: "guest".into(),
            access: SessionAccess::guest(),
        }
    }

    async fn interpreter(dir: &tempfile::TempDir) -> CommandInterpreter {
        let store = ProfileStore::new(dir.path().join("my_info.json"), "Shreyash");
        CommandInterpreter::open(store, "Shrey").await
    }

    #[tokio::test]
    async fn creator_update_is_applied_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let interp = interpreter(&dir).await;
        let action = Action::Update { field: "occupation".into(), value: "Engineer".into() };

        let resp = interp.execute(&creator_ctx(), &action).await;
        assert_eq!(resp.kind, ResponseKind::Applied);
        assert!(resp.text.starts_with("Shrey: Changed 'Occupation' from '"));

        let on_disk = interp.store().try_load().await.unwrap();
        assert_eq!(on_disk.get("Occupation").and_then(ProfileValue::as_scalar), Some("Engineer"));
    }

    #[tokio::test]
    async fn guest_add_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let interp = interpreter(&dir).await;
        let before = interp.snapshot().await;
        let action = Action::AddItem { field: "Hobbies".into(), sub_field: None, item: "chess".into() };

        let resp = interp.execute(&guest_ctx(), &action).await;
        assert_eq!(resp.kind, ResponseKind::Refused);
        assert_eq!(resp.text, "Shrey: ⛔ Creator verification required to add information.");
        assert_eq!(interp.snapshot().await, before);
        assert!(!interp.store().path().exists());
    }

    #[tokio::test]
    async fn creator_mode_off_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let interp = interpreter(&dir).await;
        let mut ctx = creator_ctx();
        ctx.access.toggle_creator_mode();
        let action = Action::RemoveItem { field: "Hobbies".into(), sub_field: None, item: "skating".into() };
        assert_eq!(interp.execute(&ctx, &action).await.kind, ResponseKind::Refused);
    }

    #[tokio::test]
    async fn usage_errors_are_gated_first() {
        let dir = tempfile::tempdir().unwrap();
        let interp = interpreter(&dir).await;
        let parsed: ParsedAction = Err(CommandUsage { kind: ActionKind::Update, hint: "usage" });

        assert_eq!(interp.execute_parsed(&guest_ctx(), &parsed).await.kind, ResponseKind::Refused);
        let resp = interp.execute_parsed(&creator_ctx(), &parsed).await;
        assert_eq!(resp.kind, ResponseKind::Invalid);
        assert_eq!(resp.text, "Shrey: usage");
    }

    #[tokio::test]
    async fn duplicate_add_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let interp = interpreter(&dir).await;
        let action = Action::AddItem { field: "hobbies".into(), sub_field: None, item: "Swimming".into() };
        let resp = interp.execute(&creator_ctx(), &action).await;
        assert_eq!(resp.kind, ResponseKind::Informational);
        assert!(!interp.store().path().exists());
    }

    #[tokio::test]
    async fn validation_error_leaves_document() {
        let dir = tempfile::tempdir().unwrap();
        let interp = interpreter(&dir).await;
        let before = interp.snapshot().await;
        let action = Action::Update { field: "Creator".into(), value: "Mallory".into() };
        let resp = interp.execute(&creator_ctx(), &action).await;
        assert_eq!(resp.kind, ResponseKind::Invalid);
        assert!(resp.text.contains("'Creator' field cannot be changed"));
        assert_eq!(interp.snapshot().await, before);
    }

    #[tokio::test]
    async fn failed_save_keeps_in_memory_change() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let store = ProfileStore::new(blocker.join("my_info.json"), "Shreyash");
        let interp = CommandInterpreter::open(store, "Shrey").await;

        let action = Action::AddItem { field: "Hobbies".into(), sub_field: None, item: "chess".into() };
        let resp = interp.execute(&creator_ctx(), &action).await;
        assert_eq!(resp.kind, ResponseKind::PersistFailed);
        let doc = interp.snapshot().await;
        assert!(doc.get("Hobbies").and_then(ProfileValue::as_list).unwrap().contains(&"chess".to_string()));
    }

    #[tokio::test]
    async fn attempts_are_audited() {
        let dir = tempfile::tempdir().unwrap();
        let audit = Arc::new(AuditLog::in_memory().unwrap());
        let interp = interpreter(&dir).await.with_audit(Arc::clone(&audit));

        let action = Action::AddItem { field: "Hobbies".into(), sub_field: None, item: "chess".into() };
        interp.execute(&guest_ctx(), &action).await;
        interp.execute(&creator_ctx(), &action).await;

        let events = audit.recent(10).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.actor == "guest" && !e.applied));
        assert!(events.iter().any(|e| e.actor == "Shreyash" && e.applied && e.action == "add_item"));
    }
}
