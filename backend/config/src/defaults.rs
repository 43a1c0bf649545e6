//! Config defaults: the values every field falls back to when the YAML
//! leaves it out.

pub const DEFAULT_BOT_NAME: &str = "Shrey";
pub const DEFAULT_CREATOR_NAME: &str = "Shreyash";

pub const DEFAULT_PROFILE_PATH: &str = "my_info.json";
pub const DEFAULT_PASSWORD_FILE: &str = "creator_password.hash";
pub const DEFAULT_SENTIMENT_DB: &str = "sentiment.db";
pub const DEFAULT_AUDIT_DB: &str = "audit.db";
pub const DEFAULT_PROFILE_BACKUPS: usize = 3;

pub const DEFAULT_MODEL_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

pub const DEFAULT_SENTIMENT_PROVIDER: &str = "huggingface";

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SESSION_TTL_MINUTES: u64 = 30;

/// Three user/assistant exchanges.
pub const DEFAULT_CONTEXT_TURNS: usize = 6;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

// serde `default = "..."` hooks

pub(crate) fn bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}
pub(crate) fn creator_name() -> String {
    DEFAULT_CREATOR_NAME.to_string()
}
pub(crate) fn profile_path() -> String {
    DEFAULT_PROFILE_PATH.to_string()
}
pub(crate) fn password_file() -> String {
    DEFAULT_PASSWORD_FILE.to_string()
}
pub(crate) fn sentiment_db() -> String {
    DEFAULT_SENTIMENT_DB.to_string()
}
pub(crate) fn audit_db() -> String {
    DEFAULT_AUDIT_DB.to_string()
}
pub(crate) fn backups() -> usize {
    DEFAULT_PROFILE_BACKUPS
}
pub(crate) fn model_provider() -> String {
    DEFAULT_MODEL_PROVIDER.to_string()
}
pub(crate) fn model() -> String {
    DEFAULT_MODEL.to_string()
}
pub(crate) fn temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
pub(crate) fn max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
pub(crate) fn sentiment_provider() -> String {
    DEFAULT_SENTIMENT_PROVIDER.to_string()
}
pub(crate) fn bind() -> String {
    DEFAULT_BIND.to_string()
}
pub(crate) fn port() -> u16 {
    DEFAULT_PORT
}
pub(crate) fn session_ttl_minutes() -> u64 {
    DEFAULT_SESSION_TTL_MINUTES
}
pub(crate) fn context_turns() -> usize {
    DEFAULT_CONTEXT_TURNS
}
pub(crate) fn log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
pub(crate) fn log_dir() -> String {
    DEFAULT_LOG_DIR.to_string()
}
