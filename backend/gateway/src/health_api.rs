//! Gateway health endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
    /// False when no model provider is configured; free-form questions get the fallback reply.
    pub model_configured: bool,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /api/health`
pub async fn get_health(State(state): State<Arc<GatewayState>>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        active_sessions: state.sessions.len().await,
        model_configured: state.ambassador.planner().is_configured(),
        timestamp: Utc::now(),
    })
}
