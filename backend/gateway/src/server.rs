//! Main HTTP gateway server and routing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use ambassador_agent::Ambassador;

use crate::api;
use crate::health_api;
use crate::rate_limit::RateLimiter;
use crate::session_registry::SessionRegistry;

/// Idle sessions are swept on this interval.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Application state shared across routes.
pub struct GatewayState {
    pub ambassador: Arc<Ambassador>,
    pub sessions: SessionRegistry,
    pub login_limiter: RateLimiter,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(ambassador: Arc<Ambassador>, sessions: SessionRegistry) -> Self {
        Self {
            ambassador,
            sessions,
            login_limiter: RateLimiter::default(),
            started_at: Instant::now(),
        }
    }

    /// Drop idle sessions, closing their open conversations.
    pub async fn sweep_expired(&self) -> usize {
        let expired = self.sessions.take_expired().await;
        for session in &expired {
            let mut chat = session.lock().await;
            self.ambassador.close_conversation(&mut chat).await;
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "Expired idle sessions");
        }
        expired.len()
    }
}

pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/api/health", get(health_api::get_health))
        .route("/api/login", post(api::login))
        .route("/api/logout", post(api::logout))
        .route("/api/chat", post(api::chat))
        .route("/api/chat_status", get(api::chat_status))
        .route("/api/history", get(api::history))
        .route("/api/creator_mode", post(api::creator_mode))
        .route("/api/language", post(api::language))
        .route("/api/sentiment/export", get(api::sentiment_export))
        .route("/api/sentiment/daily", get(api::sentiment_daily))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl-C, sweeping idle sessions in the background.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: Arc<GatewayState>) -> Result<()> {
    let sweeper = {
        let state = state.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                state.sweep_expired().await;
            }
        })
    };

    let app = build_router(state);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Gateway HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    sweeper.abort();
    Ok(())
}
