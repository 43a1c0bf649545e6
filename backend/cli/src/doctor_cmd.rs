//! `ambassador doctor`: local setup checks.

use std::path::Path;

use anyhow::Result;

use ambassador_config::{load_config, validate, AmbassadorConfig};
use ambassador_sentiment::SentimentStore;

use crate::runtime;
use crate::terminal_output::{note_error, note_success, note_warn};

#[derive(Debug, PartialEq)]
enum Check {
    Ok(String),
    Warn(String),
    Fail(String),
}

pub async fn run(config_path: &Path) -> Result<()> {
    println!("\n🔍 Checking AI Ambassador setup...\n");

    let config = match load_config(config_path).await {
        Ok(config) => config,
        Err(e) => {
            note_error(&format!("{e:#}"));
            return Ok(());
        }
    };

    let checks = diagnose(&config).await;
    for check in &checks {
        match check {
            Check::Ok(msg) => note_success(msg),
            Check::Warn(msg) => note_warn(msg),
            Check::Fail(msg) => note_error(msg),
        }
    }

    println!();
    if checks.iter().any(|c| matches!(c, Check::Fail(_))) {
        println!("❌ Some checks failed. Fix the errors above before serving.");
    } else {
        println!("✅ Ready to serve.");
    }
    Ok(())
}

async fn diagnose(config: &AmbassadorConfig) -> Vec<Check> {
    let mut checks = Vec::new();

    let report = validate(config);
    checks.extend(report.errors.iter().map(|e| Check::Fail(e.to_string())));
    checks.extend(report.warnings.iter().map(|w| Check::Warn(format!("{}: {}", w.path, w.message))));

    let password_file = Path::new(&config.storage.password_file);
    if password_file.exists() {
        checks.push(Check::Ok(format!("Creator password file found at {}", password_file.display())));
    } else {
        checks.push(Check::Warn(format!(
            "No creator password file at {}; run `ambassador hash-password <password> --write`",
            password_file.display()
        )));
    }

    match runtime::profile_store(config).try_load().await {
        Ok(_) => checks.push(Check::Ok(format!("Profile loads from {}", config.storage.profile_path))),
        Err(e) => checks.push(Check::Warn(format!("Profile will fall back to defaults: {e}"))),
    }

    match SentimentStore::open(&config.storage.sentiment_db) {
        Ok(_) => checks.push(Check::Ok(format!("Sentiment database opens at {}", config.storage.sentiment_db))),
        Err(e) => checks.push(Check::Fail(format!("{e:#}"))),
    }

    checks
}
