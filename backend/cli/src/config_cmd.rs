//! `ambassador config ...`

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use ambassador_config::{redact, AmbassadorConfig};

use crate::terminal_output::note_info;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration with secrets masked
    Show,
}

pub fn run(config: &AmbassadorConfig, path: &Path, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            note_info(&format!("Config file: {}", path.display()));
            print!("{}", render(config)?);
        }
    }
    Ok(())
}

fn render(config: &AmbassadorConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")
}
