//! Heat Route Scorer
//!
//! Heat-aware walking route assessment: heat index from temperature and
//! humidity, a shade heuristic over route instructions, exposure ranking of
//! route alternatives, and heat-safety recommendations that work offline and
//! are optionally enriched by a completion service.
//!
//! ## Architecture
//! - `heat_index`: Rothfusz regression, unit conversion, risk tiers
//! - `shade`: `ShadeEstimator` trait and the keyword/time-of-day heuristic
//! - `routes`: exposure score and `RouteRiskRanker`
//! - `recommendation/`: fallback tips, activity safety sets, prompt, reply parsing, engine
//! - `session`: in-memory planning session with last-request-wins enrichment
//! - `planner`: concurrent directions + weather fetch into a session
//! - `history`: heat index summaries over daily samples (rayon)
//! - `providers/`: collaborator traits and HTTP clients
//! - `api_server`: Axum JSON API (feature `api`)

pub mod config;
pub mod error;
pub mod heat_index;
pub mod history;
pub mod planner;
pub mod providers;
pub mod recommendation;
pub mod routes;
pub mod session;
pub mod shade;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use config::Config;
pub use error::{HeatIndexError, HistoryError, ProviderError};
pub use heat_index::{
    compute, HeatIndexResult, HeatSeverity, RiskTier, TemperatureUnit, WeatherSample,
};
pub use history::{summarize, DailySample, HeatHistorySummary};
pub use planner::{PlanRequest, RoutePlanner};
pub use providers::{CompletionProvider, Coordinates, DirectionsProvider, WeatherProvider};
pub use recommendation::{
    fallback_tips, safety_recommendations, ActivityLevel, Recommendation, RecommendationEngine,
    RecommendationInputs, RecommendationStage, RouteType, UserProfile, WarningLevel,
};
pub use routes::{safest_first, HeatExposureRisk, RouteAlternative, RouteCandidate, RouteRiskRanker};
pub use session::{PlannerSession, SessionNotice};
pub use shade::{KeywordShadeEstimator, ShadeEstimator};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
