pub mod audit;
pub mod creator_auth;

pub use audit::{new_event, AuditEvent, AuditLog};
pub use creator_auth::{hash_password, CreatorVerifier};
