//! `ambassador-config`: AI Ambassador runtime configuration.
//!
//! Provides:
//! - Typed config schema with per-field defaults
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution plus well-known override variables
//! - Redaction for safe display
//! - Validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{default_config_path, load_config, write_config};
pub use redact::redact;
pub use schema::{
    AmbassadorConfig, AssistantConfig, GatewayConfig, LoggingConfig, ModelConfig, SentimentConfig, SessionConfig,
    StorageConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env references, apply overrides and validate.
///
/// Validation errors fail the load; warnings are only logged.
pub async fn load_and_prepare(path: &Path) -> Result<AmbassadorConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    prepare(load_config(path).await?, &env)
}

fn prepare(raw: AmbassadorConfig, env: &HashMap<String, String>) -> Result<AmbassadorConfig> {
    let value: Value = serde_json::to_value(&raw).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;
    let config: AmbassadorConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    let config = apply_env_overrides(config, env);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }
    Ok(config)
}
