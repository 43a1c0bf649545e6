//! `ambassador hash-password`

use anyhow::{bail, Context, Result};

use ambassador_config::AmbassadorConfig;
use ambassador_security::hash_password;

use crate::runtime;
use crate::terminal_output::note_success;

/// Print the hash; with `write`, also store it in the configured password file.
pub fn run(config: &AmbassadorConfig, password: &str, write: bool) -> Result<()> {
    println!("{}", hash(config, password, write)?);
    Ok(())
}

fn hash(config: &AmbassadorConfig, password: &str, write: bool) -> Result<String> {
    if password.trim().is_empty() {
        bail!("Password cannot be empty");
    }
    if write {
        let verifier = runtime::verifier(config);
        verifier
            .write_hash(password)
            .with_context(|| format!("Failed to write {}", verifier.password_file().display()))?;
        note_success(&format!("Creator password hash written to {}", verifier.password_file().display()));
    }
    Ok(hash_password(password))
}
