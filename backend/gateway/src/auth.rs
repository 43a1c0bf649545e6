//! Session extraction.
//!
//! Every API request is bound to a chat session through the `x-session-id`
//! header. A missing, unknown or expired id gets a freshly minted session;
//! handlers echo the id back in the same header.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::info;

use crate::server::GatewayState;
use crate::session_registry::{SessionId, SharedSession};

pub const SESSION_HEADER: &str = "x-session-id";

pub struct ChatSession {
    pub id: SessionId,
    pub session: SharedSession,
}

impl ChatSession {
    /// Header pair to attach to the response.
    pub fn header(&self) -> [(&'static str, String); 1] {
        [(SESSION_HEADER, self.id.clone())]
    }
}

#[async_trait]
impl FromRequestParts<Arc<GatewayState>> for ChatSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<GatewayState>) -> Result<Self, Self::Rejection> {
        let requested = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|val| val.to_str().ok());

        let resolved = state.sessions.resolve(requested).await;
        if let Some(expired) = resolved.expired {
            let mut old = expired.lock().await;
            info!(session_id = %old.session_id, "Closing expired session");
            state.ambassador.close_conversation(&mut old).await;
        }
        if resolved.minted {
            info!(session_id = %resolved.id, "New chat session");
        }

        Ok(ChatSession { id: resolved.id, session: resolved.session })
    }
}
