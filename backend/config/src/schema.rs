//! AI Ambassador runtime configuration schema.
//!
//! camelCase YAML, every field optional in the file.

use serde::{Deserialize, Serialize};

use crate::defaults;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AmbassadorConfig {
    pub assistant: AssistantConfig,
    pub storage: StorageConfig,
    pub model: ModelConfig,
    pub sentiment: SentimentConfig,
    pub gateway: GatewayConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Assistant identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    #[serde(default = "defaults::bot_name")]
    pub bot_name: String,
    /// Must match the `Creator` field of the profile document.
    #[serde(default = "defaults::creator_name")]
    pub creator_name: String,
    /// Email that selects the password check at the login endpoint.
    #[serde(default)]
    pub creator_email: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            bot_name: defaults::bot_name(),
            creator_name: defaults::creator_name(),
            creator_email: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default = "defaults::profile_path")]
    pub profile_path: String,
    #[serde(default = "defaults::password_file")]
    pub password_file: String,
    #[serde(default = "defaults::sentiment_db")]
    pub sentiment_db: String,
    #[serde(default = "defaults::audit_db")]
    pub audit_db: String,
    /// Rolling copies of the profile kept before each overwrite.
    #[serde(default = "defaults::backups")]
    pub backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            profile_path: defaults::profile_path(),
            password_file: defaults::password_file(),
            sentiment_db: defaults::sentiment_db(),
            audit_db: defaults::audit_db(),
            backups: defaults::backups(),
        }
    }
}

// ---------------------------------------------------------------------------
// Language model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    /// `gemini` or `mock`.
    #[serde(default = "defaults::model_provider")]
    pub provider: String,
    #[serde(default = "defaults::model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "defaults::temperature")]
    pub temperature: f32,
    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: defaults::model_provider(),
            model: defaults::model(),
            api_key: String::new(),
            base_url: None,
            temperature: defaults::temperature(),
            max_tokens: defaults::max_tokens(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sentiment classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentConfig {
    /// `huggingface` or `disabled`.
    #[serde(default = "defaults::sentiment_provider")]
    pub provider: String,
    /// Empty means the provider's default endpoint.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_token: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            provider: defaults::sentiment_provider(),
            endpoint: String::new(),
            api_token: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Gateway / session / logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default = "defaults::bind")]
    pub bind: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    /// Idle minutes before a session is dropped.
    #[serde(default = "defaults::session_ttl_minutes")]
    pub session_ttl_minutes: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
            port: defaults::port(),
            session_ttl_minutes: defaults::session_ttl_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Turns of conversation context sent with each model request.
    #[serde(default = "defaults::context_turns")]
    pub context_turns: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { context_turns: defaults::context_turns() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
    #[serde(default = "defaults::log_dir")]
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            dir: defaults::log_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_all_defaults() {
        let cfg: AmbassadorConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, AmbassadorConfig::default());
        assert_eq!(cfg.gateway.port, 5000);
        assert_eq!(cfg.session.context_turns, 6);
        assert_eq!(cfg.model.model, "gemini-2.0-flash");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = "assistant:\n  creatorEmail: owner@example.com\ngateway:\n  port: 8080\n";
        let cfg: AmbassadorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.assistant.creator_email, "owner@example.com");
        assert_eq!(cfg.assistant.bot_name, "Shrey");
        assert_eq!(cfg.gateway.port, 8080);
        assert_eq!(cfg.gateway.session_ttl_minutes, 30);
    }

    #[test]
    fn serializes_camel_case() {
        let yaml = serde_yaml::to_string(&AmbassadorConfig::default()).unwrap();
        assert!(yaml.contains("sessionTtlMinutes: 30"));
        assert!(yaml.contains("profilePath: my_info.json"));
        assert!(!yaml.contains("baseUrl"));
    }
}
