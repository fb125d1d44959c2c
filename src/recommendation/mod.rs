//! Heat-safety recommendations
//!
//! - `fallback.rs` - deterministic route tips (heat index × route type × duration)
//! - `safety.rs` - activity-level warning sets
//! - `parse.rs` - completion reply → tip list
//! - `prompt.rs` - completion prompt construction
//! - `engine.rs` - two-stage fallback/enrichment state machine

pub mod fallback;
pub mod safety;
pub mod parse;
pub mod prompt;
pub mod engine;

pub use fallback::{fallback_tips, RouteType};
pub use safety::{safety_recommendations, ActivityLevel, SafetyRecommendationSet, WarningLevel};
pub use parse::parse_recommendations;
pub use prompt::{CompletionPrompt, EnrichmentContext, UserProfile};
pub use engine::{
    EnrichmentOutcome, Recommendation, RecommendationEngine, RecommendationInputs,
    RecommendationStage,
};
