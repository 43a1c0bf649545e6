/// Creator password verification against a stored SHA-256 hash.
///
/// The hash file holds one lowercase hex digest. Anything unexpected
/// (missing file, unreadable file, empty digest) fails closed.
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{error, warn};

/// Hex-encoded SHA-256 of a password, as stored in the hash file.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct CreatorVerifier {
    password_file: PathBuf,
}

impl CreatorVerifier {
    pub fn new(password_file: impl Into<PathBuf>) -> Self {
        Self { password_file: password_file.into() }
    }

    pub fn password_file(&self) -> &Path {
        &self.password_file
    }

    /// Log setup instructions if the hash file is missing. Never fatal.
    pub fn check_setup(&self) -> bool {
        if self.password_file.exists() {
            return true;
        }
        warn!(
            path = %self.password_file.display(),
            "Creator password file not found; creator login is disabled until it exists"
        );
        warn!(
            "Create it with `ambassador hash-password <password> --write`, or put the SHA-256 hex digest of the password in that file"
        );
        false
    }

    /// Compare the attempt's hash with the stored one. The file is re-read on
    /// every call so a rotated password takes effect without a restart.
    pub fn verify(&self, attempt: &str) -> bool {
        let stored = match std::fs::read_to_string(&self.password_file) {
            Ok(raw) => raw.trim().to_ascii_lowercase(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.password_file.display(), "Password file missing during verification");
                return false;
            }
            Err(e) => {
                error!(path = %self.password_file.display(), error = %e, "Failed to read password file");
                return false;
            }
        };
        if stored.is_empty() {
            return false;
        }
        constant_time_eq(hash_password(attempt).as_bytes(), stored.as_bytes())
    }

    /// Write the hash of `password` to the configured file.
    pub fn write_hash(&self, password: &str) -> std::io::Result<()> {
        if let Some(parent) = self.password_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.password_file, hash_password(password))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
