//! Config validation: field checks with user-friendly messages.

use crate::schema::AmbassadorConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

/// One week.
const MAX_SESSION_TTL_MINUTES: u64 = 7 * 24 * 60;

pub fn validate(config: &AmbassadorConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_assistant(config, &mut report);
    validate_storage(config, &mut report);
    validate_model(config, &mut report);
    validate_gateway(config, &mut report);
    report
}

fn validate_assistant(config: &AmbassadorConfig, report: &mut ValidationReport) {
    let assistant = &config.assistant;
    if assistant.bot_name.trim().is_empty() {
        report.error("assistant.botName", "Bot name cannot be empty");
    }
    if assistant.creator_name.trim().is_empty() {
        report.error("assistant.creatorName", "Creator name cannot be empty");
    }
    if assistant.creator_email.trim().is_empty() {
        report.warn("assistant.creatorEmail", "No creator email configured; creator login is only possible through the chat login command");
    }
}

fn validate_storage(config: &AmbassadorConfig, report: &mut ValidationReport) {
    if config.storage.profile_path.trim().is_empty() {
        report.error("storage.profilePath", "Profile path cannot be empty");
    }
    if config.storage.password_file.trim().is_empty() {
        report.error("storage.passwordFile", "Password file path cannot be empty");
    }
}

fn validate_model(config: &AmbassadorConfig, report: &mut ValidationReport) {
    let model = &config.model;
    if !(0.0..=2.0).contains(&model.temperature) {
        report.error("model.temperature", format!("Temperature {} is outside 0.0..=2.0", model.temperature));
    }
    if model.max_tokens == 0 {
        report.error("model.maxTokens", "maxTokens must be greater than 0");
    }
    if model.provider.eq_ignore_ascii_case("gemini") && model.api_key.trim().is_empty() {
        report.warn("model.apiKey", "No Gemini API key; free-form questions will get the fallback reply");
    }
    if config.session.context_turns == 0 {
        report.error("session.contextTurns", "contextTurns must be at least 1");
    }
}

fn validate_gateway(config: &AmbassadorConfig, report: &mut ValidationReport) {
    let gateway = &config.gateway;
    if gateway.session_ttl_minutes == 0 {
        report.error("gateway.sessionTtlMinutes", "Session TTL must be at least 1 minute");
    } else if gateway.session_ttl_minutes > MAX_SESSION_TTL_MINUTES {
        report.error(
            "gateway.sessionTtlMinutes",
            format!("Session TTL cannot exceed {MAX_SESSION_TTL_MINUTES} minutes (one week)"),
        );
    }
    if gateway.port != 0 && gateway.port < 1024 {
        report.warn("gateway.port", format!("Port {} is privileged and may need elevated permissions", gateway.port));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_only_warn() {
        let report = validate(&AmbassadorConfig::default());
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.path == "assistant.creatorEmail"));
        assert!(report.warnings.iter().any(|w| w.path == "model.apiKey"));
    }

    #[test]
    fn collects_every_error() {
        let mut cfg = AmbassadorConfig::default();
        cfg.assistant.creator_name = " ".into();
        cfg.model.temperature = 3.5;
        cfg.model.max_tokens = 0;
        cfg.session.context_turns = 0;
        cfg.gateway.session_ttl_minutes = 0;
        cfg.gateway.port = 80;

        let report = validate(&cfg);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "assistant.creatorName",
                "model.temperature",
                "model.maxTokens",
                "session.contextTurns",
                "gateway.sessionTtlMinutes",
            ]
        );
        assert!(report.warnings.iter().any(|w| w.path == "gateway.port"));
    }

    #[test]
    fn rejects_absurd_session_ttl() {
        let mut cfg = AmbassadorConfig::default();
        cfg.gateway.session_ttl_minutes = u64::MAX;
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "gateway.sessionTtlMinutes"));

        cfg.gateway.session_ttl_minutes = 7 * 24 * 60;
        assert!(validate(&cfg).is_valid());
    }
}
