//! Wires the configured components into a running `Ambassador`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use ambassador_agent::{Ambassador, AssistantIdentity};
use ambassador_commands::CommandInterpreter;
use ambassador_config::AmbassadorConfig;
use ambassador_planner::{build_provider, ModelPlanner, ModelSettings};
use ambassador_profile::ProfileStore;
use ambassador_security::{AuditLog, CreatorVerifier};
use ambassador_sentiment::{build_classifier, SentimentAggregator, SentimentStore};
use ambassador_gateway::{GatewayState, SessionRegistry};

pub fn profile_store(config: &AmbassadorConfig) -> ProfileStore {
    ProfileStore::new(&config.storage.profile_path, &config.assistant.creator_name)
        .with_backups(config.storage.backups)
}

pub fn verifier(config: &AmbassadorConfig) -> CreatorVerifier {
    CreatorVerifier::new(&config.storage.password_file)
}

/// Aggregator over the configured database. The classifier is built from
/// config too; read-only commands never call it.
pub fn sentiment_aggregator(config: &AmbassadorConfig) -> Result<SentimentAggregator> {
    let store = SentimentStore::open(&config.storage.sentiment_db)
        .with_context(|| format!("Failed to open sentiment database {}", config.storage.sentiment_db))?;
    let classifier = build_classifier(
        &config.sentiment.provider,
        &config.sentiment.endpoint,
        &config.sentiment.api_token,
    );
    Ok(SentimentAggregator::new(classifier, store))
}

pub async fn build_ambassador(config: &AmbassadorConfig) -> Result<Ambassador> {
    let audit = Arc::new(
        AuditLog::open(&config.storage.audit_db)
            .with_context(|| format!("Failed to open audit database {}", config.storage.audit_db))?,
    );

    let interpreter = CommandInterpreter::open(profile_store(config), &config.assistant.bot_name)
        .await
        .with_audit(audit.clone());

    let model = &config.model;
    let provider = build_provider(&model.provider, &model.api_key, model.base_url.as_deref());
    let planner = ModelPlanner::new(
        provider,
        ModelSettings {
            model: model.model.clone(),
            temperature: model.temperature,
            max_tokens: model.max_tokens,
        },
    );

    let verifier = verifier(config);
    verifier.check_setup();

    let identity = AssistantIdentity::new(
        &config.assistant.bot_name,
        &config.assistant.creator_name,
        &config.assistant.creator_email,
    );
    info!(bot = %identity.bot_name, creator = %identity.creator_name, "Ambassador assembled");

    Ok(Ambassador::new(
        identity,
        Arc::new(interpreter),
        Arc::new(planner),
        Arc::new(sentiment_aggregator(config)?),
        verifier,
    )
    .with_audit(audit))
}

pub async fn gateway_state(config: &AmbassadorConfig) -> Result<Arc<GatewayState>> {
    let ambassador = Arc::new(build_ambassador(config).await?);
    let sessions = SessionRegistry::new(
        Duration::from_secs(config.gateway.session_ttl_minutes.saturating_mul(60)),
        config.session.context_turns,
    );
    Ok(Arc::new(GatewayState::new(ambassador, sessions)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn temp_config(dir: &std::path::Path) -> AmbassadorConfig {
        let path = |name: &str| dir.join(name).to_string_lossy().into_owned();
        let mut config = AmbassadorConfig::default();
        config.storage.profile_path = path("my_info.json");
        config.storage.password_file = path("creator_password.hash");
        config.storage.sentiment_db = path("sentiment.db");
        config.storage.audit_db = path("audit.db");
        config.model.provider = "mock".into();
        config.sentiment.provider = "disabled".into();
        config
    }

    #[tokio::test]
    async fn builds_from_config_without_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let state = gateway_state(&temp_config(dir.path())).await.unwrap();

        assert!(state.ambassador.planner().is_configured());
        assert_eq!(state.ambassador.identity().bot_name, "Shrey");
        assert_eq!(state.sessions.ttl(), Duration::from_secs(30 * 60));
        assert!(dir.path().join("sentiment.db").exists());
    }

    #[tokio::test]
    async fn gemini_without_key_still_builds() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = temp_config(dir.path());
        config.model.provider = "gemini".into();
        let ambassador = build_ambassador(&config).await.unwrap();
        assert!(!ambassador.planner().is_configured());
    }

    #[tokio::test]
    async fn huge_session_ttl_saturates() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = temp_config(dir.path());
        config.gateway.session_ttl_minutes = u64::MAX;
        let state = gateway_state(&config).await.unwrap();
        assert_eq!(state.sessions.ttl(), Duration::from_secs(u64::MAX));
    }
}
