//! AI Ambassador HTTP gateway.
//!
//! JSON API over the conversation runtime, with header-selected sessions.

pub mod api;
pub mod auth;
pub mod health_api;
pub mod rate_limit;
pub mod server;
pub mod session_registry;

pub use auth::SESSION_HEADER;
pub use server::{build_router, start_server, GatewayState};
pub use session_registry::SessionRegistry;
