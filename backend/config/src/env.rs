//! Environment variable handling for config values.
//!
//! Two layers:
//! - `${VAR_NAME}` references inside string values, resolved at load time
//!   (uppercase `[A-Z_][A-Z0-9_]*` names only, `$${VAR}` escapes to a literal).
//! - Well-known override variables applied on top of the parsed config.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::schema::AmbassadorConfig;

/// Optional leading `$` marks an escaped reference.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const PORT_VAR: &str = "AMBASSADOR_PORT";
pub const BIND_VAR: &str = "AMBASSADOR_BIND";
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
pub const HF_TOKEN_VAR: &str = "HF_API_TOKEN";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Only string leaves are processed. Fails if any referenced var is unset or empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut error: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                error.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = error {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Collect all env var names referenced in a config value tree.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars_recursive(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars_recursive(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for caps in ENV_VAR_PATTERN.captures_iter(s) {
                if caps[1].is_empty() {
                    out.push(caps[2].to_string());
                }
            }
        }
        Value::Array(arr) => arr.iter().for_each(|v| collect_vars_recursive(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars_recursive(v, out)),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Override variables
// ---------------------------------------------------------------------------

/// Apply the well-known override variables. Empty values are ignored.
pub fn apply_env_overrides(mut config: AmbassadorConfig, env: &HashMap<String, String>) -> AmbassadorConfig {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(port) = get(PORT_VAR) {
        match port.parse::<u16>() {
            Ok(port) => {
                debug!(port, "Port overridden from environment");
                config.gateway.port = port;
            }
            Err(_) => warn!(value = %port, "Ignoring unparseable {PORT_VAR}"),
        }
    }
    if let Some(bind) = get(BIND_VAR) {
        config.gateway.bind = bind.to_string();
    }
    if let Some(key) = get(GEMINI_KEY_VAR) {
        config.model.api_key = key.to_string();
    }
    if let Some(token) = get(HF_TOKEN_VAR) {
        config.sentiment.api_token = token.to_string();
    }
    config
}
