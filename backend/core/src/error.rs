use thiserror::Error;

/// Top-level error type for the Ambassador runtime.
#[derive(Debug, Error)]
pub enum AmbassadorError {
    #[error("creator verification required")]
    VerificationRequired,

    #[error("LLM provider error ({provider}): {message}")]
    LlmError { provider: String, message: String },

    #[error("sentiment classifier error: {0}")]
    ClassifierError(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("unsupported language code: {0}")]
    InvalidLanguage(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
