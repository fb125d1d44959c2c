//! Route planning session
//!
//! Single-user, in-memory state for one planning screen. Weather and route
//! results may arrive in either order; every input change re-derives the
//! candidate view and starts a new recommendation cycle.
//!
//! Each cycle gets a fresh token. An enrichment result carrying an older token
//! is discarded, so a slow reply for a previously selected route can never
//! overwrite the tips for the current one (last request wins).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::heat_index::{HeatIndexResult, WeatherSample};
use crate::recommendation::{
    CompletionPrompt, EnrichmentOutcome, Recommendation, RecommendationEngine, RecommendationInputs,
    UserProfile,
};
use crate::routes::{RouteAlternative, RouteCandidate, RouteRiskRanker};
use crate::shade::{current_local_hour, KeywordShadeEstimator, ShadeEstimator};

/// Informational messages for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionNotice {
    NoRoutesFound,
    ConditionsUnavailable,
}

impl fmt::Display for SessionNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionNotice::NoRoutesFound => write!(f, "No routes found between these locations."),
            SessionNotice::ConditionsUnavailable => write!(f, "Current conditions unavailable."),
        }
    }
}

/// Handle for one in-flight enrichment request
#[derive(Debug, Clone)]
pub struct EnrichmentTicket {
    token: u64,
    route_index: Option<usize>,
    pub prompt: CompletionPrompt,
}

impl EnrichmentTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn route_index(&self) -> Option<usize> {
        self.route_index
    }
}

pub struct PlannerSession {
    engine: RecommendationEngine,
    estimator: Arc<dyn ShadeEstimator>,
    ranker: RouteRiskRanker,
    pinned_hour: Option<u32>,

    weather: Option<WeatherSample>,
    heat_index: Option<HeatIndexResult>,
    user: Option<UserProfile>,

    /// As fetched; replaced wholesale on a new search, never edited
    alternatives: Vec<RouteAlternative>,
    candidates: Vec<RouteCandidate>,
    selected: Option<usize>,

    recommendation: Recommendation,
    token: u64,
    notices: Vec<SessionNotice>,
}

impl PlannerSession {
    pub fn new(engine: RecommendationEngine) -> Self {
        let recommendation = engine.fallback(&RecommendationInputs::default());
        Self {
            engine,
            estimator: Arc::new(KeywordShadeEstimator::default()),
            ranker: RouteRiskRanker,
            pinned_hour: None,
            weather: None,
            heat_index: None,
            user: None,
            alternatives: Vec::new(),
            candidates: Vec::new(),
            selected: None,
            recommendation,
            token: 0,
            notices: Vec::new(),
        }
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn ShadeEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Fix the hour used for shade estimation instead of the wall clock
    pub fn with_hour(mut self, hour: u32) -> Self {
        self.pinned_hour = Some(hour % 24);
        self
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Weather fetch finished (successfully or not)
    pub fn apply_weather(
        &mut self,
        result: Result<WeatherSample, ProviderError>,
    ) -> Option<EnrichmentTicket> {
        self.notices.retain(|n| *n != SessionNotice::ConditionsUnavailable);

        match result.map_err(|e| e.to_string()).and_then(|w| {
            let hi = w.heat_index().map_err(|e| e.to_string())?;
            Ok((w, hi))
        }) {
            Ok((weather, heat_index)) => {
                tracing::debug!(
                    "Heat index {:.1}{} ({:?})",
                    heat_index.value,
                    heat_index.unit.symbol(),
                    heat_index.risk_tier
                );
                self.weather = Some(weather);
                self.heat_index = Some(heat_index);
            }
            Err(reason) => {
                tracing::warn!("Weather unavailable: {}", reason);
                self.weather = None;
                self.heat_index = None;
                self.notices.push(SessionNotice::ConditionsUnavailable);
            }
        }

        self.rerank();
        self.refresh()
    }

    /// Directions fetch finished; replaces the previous candidate set
    pub fn apply_routes(
        &mut self,
        result: Result<Vec<RouteAlternative>, ProviderError>,
    ) -> Option<EnrichmentTicket> {
        self.notices.retain(|n| *n != SessionNotice::NoRoutesFound);

        self.alternatives = result.unwrap_or_else(|e| {
            tracing::warn!("Directions unavailable: {}", e);
            Vec::new()
        });

        if self.alternatives.is_empty() {
            self.selected = None;
            self.notices.push(SessionNotice::NoRoutesFound);
        } else {
            self.selected = Some(0);
        }

        self.rerank();
        self.refresh()
    }

    /// Select a candidate by its original index. Returns `None` and leaves the
    /// selection alone when the index is out of range.
    pub fn select_route(&mut self, index: usize) -> Option<EnrichmentTicket> {
        if index >= self.candidates.len() {
            tracing::debug!("Ignoring selection of missing route {}", index);
            return None;
        }
        self.selected = Some(index);
        self.refresh()
    }

    pub fn set_user(&mut self, user: Option<UserProfile>) -> Option<EnrichmentTicket> {
        self.user = user;
        self.refresh()
    }

    /// Deliver an enrichment outcome. Stale tickets are dropped; returns
    /// whether the outcome was applied.
    pub fn complete_enrichment(
        &mut self,
        ticket: EnrichmentTicket,
        outcome: EnrichmentOutcome,
    ) -> bool {
        if ticket.token != self.token {
            tracing::debug!(
                "Discarding stale enrichment (ticket {}, current {})",
                ticket.token,
                self.token
            );
            return false;
        }
        self.recommendation.apply_enrichment(outcome);
        self.recommendation.settle();
        true
    }

    // ========================================================================
    // Derived state
    // ========================================================================

    fn rerank(&mut self) {
        let hour = self.pinned_hour.unwrap_or_else(current_local_hour);
        self.candidates = self.ranker.rank_all(
            &self.alternatives,
            self.estimator.as_ref(),
            self.heat_index.as_ref(),
            hour,
        );
    }

    /// New cycle: bump the token, compute fallback, and hand back a ticket if
    /// enrichment should be attempted
    fn refresh(&mut self) -> Option<EnrichmentTicket> {
        self.token += 1;

        let inputs = RecommendationInputs {
            heat_index: self.heat_index.as_ref(),
            route: self.selected_candidate(),
            weather: self.weather.as_ref(),
            user: self.user.as_ref(),
        };

        let mut recommendation = self.engine.fallback(&inputs);
        let prompt = self.engine.enrichment_prompt(&inputs);

        let ticket = match prompt {
            Some(prompt) => {
                recommendation.begin_enrichment();
                Some(EnrichmentTicket {
                    token: self.token,
                    route_index: self.selected,
                    prompt,
                })
            }
            None => {
                recommendation.settle();
                None
            }
        };

        self.recommendation = recommendation;
        ticket
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    pub fn candidates(&self) -> &[RouteCandidate] {
        &self.candidates
    }

    pub fn alternatives(&self) -> &[RouteAlternative] {
        &self.alternatives
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_candidate(&self) -> Option<&RouteCandidate> {
        self.selected.and_then(|i| self.candidates.get(i))
    }

    pub fn weather(&self) -> Option<&WeatherSample> {
        self.weather.as_ref()
    }

    pub fn heat_index(&self) -> Option<&HeatIndexResult> {
        self.heat_index.as_ref()
    }

    pub fn recommendation(&self) -> &Recommendation {
        &self.recommendation
    }

    pub fn tips(&self) -> &[String] {
        self.recommendation.tips()
    }

    pub fn notices(&self) -> &[SessionNotice] {
        &self.notices
    }
}
