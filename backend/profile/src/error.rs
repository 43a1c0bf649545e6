use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("profile file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("creator mismatch: expected '{expected}', found {found:?}")]
    CreatorMismatch { expected: String, found: Option<String> },
}
