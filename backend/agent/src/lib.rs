//! AI Ambassador conversation runtime
//!
//! Per-session state, the bounded conversation context, prompt building and
//! the turn loop that routes each message to the command grammar or the
//! model.

pub mod agent_loop;
pub mod assistant_identity;
pub mod context_window;
pub mod session_state;
pub mod system_prompt;

pub use agent_loop::{Ambassador, AuthOutcome, ChatReply, ChatStatus, ReplySource};
pub use assistant_identity::AssistantIdentity;
pub use context_window::{ConversationContext, DEFAULT_CONTEXT_TURNS};
pub use session_state::SessionState;
pub use system_prompt::PromptBuilder;
