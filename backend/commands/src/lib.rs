pub mod detection;
pub mod dispatch;
pub mod interpreter;
pub mod registry;
pub mod schema;
pub mod types;

pub use detection::detect_command;
pub use dispatch::{CommandContext, CommandInterpreter, CommandResponse, ResponseKind};
pub use interpreter::apply;
pub use registry::{builtin_commands, help_text, CommandDef};
pub use schema::{decode_model_output, ActionError, ModelOutput};
pub use types::{Action, ActionKind, ActionOutcome, CommandUsage, ParsedAction, TextCommand};
