pub mod planner;
pub mod providers;

pub use planner::{ModelPlanner, ModelSettings, FALLBACK_REPLY};
pub use providers::gemini::GeminiProvider;
pub use providers::mock::MockProvider;
pub use providers::build_provider;
