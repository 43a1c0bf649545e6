//! REST handlers for the chat surface.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use ambassador_commands::{detect_command, TextCommand};
use ambassador_core::AmbassadorError;
use logging::{ConversationEvent, EventLogger};

use crate::auth::ChatSession;
use crate::server::GatewayState;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler failure rendered as `{"error": ...}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Internal cause, logged but never sent to the client.
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), detail: None }
    }

    fn internal(err: anyhow::Error) -> Self {
        let detail = format!("{err:#}");
        error!(error = %detail, "Request failed");
        Self { detail: Some(detail), ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error") }
    }

    /// Server-side failures become an `Error` conversation event.
    fn conversation_event(&self) -> Option<ConversationEvent> {
        if !self.status.is_server_error() {
            return None;
        }
        let error_msg = self.detail.clone().unwrap_or_else(|| self.message.clone());
        Some(ConversationEvent::Error { error_msg })
    }
}

impl From<AmbassadorError> for ApiError {
    fn from(err: AmbassadorError) -> Self {
        match err {
            AmbassadorError::VerificationRequired => Self::new(StatusCode::FORBIDDEN, "⛔ Verification required"),
            AmbassadorError::InvalidLanguage(_) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            other => Self::internal(anyhow::anyhow!(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Attach the session header to any outcome.
fn respond(session: &ChatSession, result: Result<Response, ApiError>) -> Response {
    match result {
        Ok(resp) => (session.header(), resp).into_response(),
        Err(err) => {
            if let Some(event) = err.conversation_event() {
                EventLogger::log_event(&session.id, event);
            }
            (session.header(), err).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_input: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub code: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /api/login`
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    session: ChatSession,
    Json(body): Json<LoginRequest>,
) -> Response {
    if !state.login_limiter.check_limit(&body.email).await {
        warn!(session_id = %session.id, "Login rate limited");
        let err = ApiError::new(StatusCode::TOO_MANY_REQUESTS, "Too many login attempts. Try again later.");
        return respond(&session, Err(err));
    }

    let mut chat = session.session.lock().await;
    let outcome = state.ambassador.authenticate(&mut chat, &body.email, body.password.as_deref()).await;
    drop(chat);

    let status = if outcome.success {
        state.login_limiter.reset(&body.email).await;
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    respond(&session, Ok((status, Json(outcome)).into_response()))
}

/// `POST /api/logout`
pub async fn logout(State(state): State<Arc<GatewayState>>, session: ChatSession) -> Response {
    let mut chat = session.session.lock().await;
    let message = state.ambassador.logout(&mut chat).await;
    drop(chat);
    respond(&session, Ok(Json(json!({ "response": message })).into_response()))
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<Arc<GatewayState>>,
    session: ChatSession,
    Json(body): Json<ChatRequest>,
) -> Response {
    // A chat login checks the creator password too, so it shares the
    // creator email's attempt budget with `/api/login`.
    let identity = state.ambassador.identity();
    let is_login = matches!(
        detect_command(body.user_input.trim(), &identity.creator_name),
        Some(TextCommand::Login { .. })
    );
    if is_login && !state.login_limiter.check_limit(&identity.creator_email).await {
        warn!(session_id = %session.id, "Chat login rate limited");
        let err = ApiError::new(StatusCode::TOO_MANY_REQUESTS, "Too many login attempts. Try again later.");
        return respond(&session, Err(err));
    }

    let mut chat = session.session.lock().await;
    let reply = state.ambassador.submit_message(&mut chat, &body.user_input).await;
    drop(chat);

    if is_login && reply.is_creator {
        state.login_limiter.reset(&identity.creator_email).await;
    }
    respond(&session, Ok(Json(reply).into_response()))
}

/// `GET /api/chat_status`
pub async fn chat_status(State(state): State<Arc<GatewayState>>, session: ChatSession) -> Response {
    let status = state.ambassador.status(&*session.session.lock().await);
    respond(&session, Ok(Json(status).into_response()))
}

/// `GET /api/history`
pub async fn history(State(state): State<Arc<GatewayState>>, session: ChatSession) -> Response {
    let turns = state.ambassador.history(&*session.session.lock().await);
    respond(&session, Ok(Json(json!({ "history": turns })).into_response()))
}

/// `POST /api/creator_mode`
pub async fn creator_mode(State(state): State<Arc<GatewayState>>, session: ChatSession) -> Response {
    let mut chat = session.session.lock().await;
    let result = state
        .ambassador
        .toggle_creator_mode(&mut chat)
        .await
        .map(|active| Json(json!({ "creator_mode": active })).into_response())
        .map_err(ApiError::from);
    drop(chat);
    respond(&session, result)
}

/// `POST /api/language`
pub async fn language(
    State(state): State<Arc<GatewayState>>,
    session: ChatSession,
    Json(body): Json<LanguageRequest>,
) -> Response {
    let mut chat = session.session.lock().await;
    let result = state
        .ambassador
        .set_language(&mut chat, &body.code)
        .map(|code| Json(json!({ "language": code })).into_response())
        .map_err(ApiError::from);
    drop(chat);
    respond(&session, result)
}

/// `GET /api/sentiment/export`
pub async fn sentiment_export(State(state): State<Arc<GatewayState>>, session: ChatSession) -> Response {
    let result: Result<Response, ApiError> = async {
        require_creator(&session).await?;
        let csv = state.ambassador.sentiment().export_csv().await.map_err(ApiError::internal)?;
        Ok::<_, ApiError>((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"sentiment_log.csv\""),
            ],
            csv,
        )
            .into_response())
    }
    .await;
    respond(&session, result)
}

/// `GET /api/sentiment/daily`
pub async fn sentiment_daily(State(state): State<Arc<GatewayState>>, session: ChatSession) -> Response {
    let result: Result<Response, ApiError> = async {
        require_creator(&session).await?;
        let days = state.ambassador.sentiment().daily_summaries().await.map_err(ApiError::internal)?;
        Ok::<_, ApiError>(Json(days).into_response())
    }
    .await;
    respond(&session, result)
}

/// Sentiment logs hold every visitor's messages, so only the verified creator may read them.
async fn require_creator(session: &ChatSession) -> Result<(), ApiError> {
    if session.session.lock().await.is_creator() {
        Ok(())
    } else {
        Err(AmbassadorError::VerificationRequired.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_detail_but_log_it() {
        let err = ApiError::internal(anyhow::anyhow!("disk full").context("Failed to export sentiment log"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal error");
        match err.conversation_event() {
            Some(ConversationEvent::Error { error_msg }) => {
                assert_eq!(error_msg, "Failed to export sentiment log: disk full");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn client_errors_are_not_conversation_errors() {
        assert!(ApiError::from(AmbassadorError::VerificationRequired).conversation_event().is_none());
        assert!(ApiError::new(StatusCode::TOO_MANY_REQUESTS, "slow down").conversation_event().is_none());
    }
}
