//! `ambassador profile ...`

use anyhow::{Context, Result};
use clap::Subcommand;

use ambassador_config::AmbassadorConfig;

use crate::runtime;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Print the stored profile as JSON
    Show,
}

pub async fn run(config: &AmbassadorConfig, cmd: ProfileCommands) -> Result<()> {
    match cmd {
        ProfileCommands::Show => println!("{}", show(config).await?),
    }
    Ok(())
}

/// Same degrade rules as the server: a missing or unreadable file shows the default profile.
async fn show(config: &AmbassadorConfig) -> Result<String> {
    let doc = runtime::profile_store(config).load().await;
    doc.to_pretty_json().context("Failed to render profile")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::tests::temp_config;

    #[tokio::test]
    async fn shows_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let json = show(&temp_config(dir.path())).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["Creator"], "Shreyash");
    }
}
