pub mod error;
pub mod message;
pub mod profile;
pub mod session_policy;
pub mod traits;
pub mod types;

pub use error::AmbassadorError;
pub use message::{ConversationTurn, TurnRole};
pub use profile::{ProfileDocument, ProfileValue, CREATOR_FIELD};
pub use session_policy::SessionAccess;
pub use traits::{LlmProvider, LlmRequest, LlmResponse, SentimentClassifier};
pub use types::{SentimentLabel, SentimentScore};
