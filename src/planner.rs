//! Route planning orchestration
//!
//! Issues the directions and weather requests concurrently and feeds both
//! results into a [`PlannerSession`]. Either collaborator may be missing or
//! fail; the session turns that into notices instead of errors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::providers::{Coordinates, DirectionsProvider, WeatherProvider};
use crate::recommendation::{EnrichmentOutcome, RecommendationEngine, UserProfile};
use crate::session::PlannerSession;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub origin: String,
    pub destination: String,
    /// Where to read current conditions (usually the origin)
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    /// Local hour override for shade estimation
    #[serde(default)]
    pub hour: Option<u32>,
}

#[derive(Clone, Default)]
pub struct RoutePlanner {
    directions: Option<Arc<dyn DirectionsProvider>>,
    weather: Option<Arc<dyn WeatherProvider>>,
    engine: RecommendationEngine,
}

impl RoutePlanner {
    pub fn new(
        directions: Option<Arc<dyn DirectionsProvider>>,
        weather: Option<Arc<dyn WeatherProvider>>,
        engine: RecommendationEngine,
    ) -> Self {
        Self { directions, weather, engine }
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Fetch, rank and recommend. With `enrich` set, the enrichment for the
    /// default selection is awaited before returning.
    pub async fn plan(&self, request: &PlanRequest, enrich: bool) -> PlannerSession {
        let routes_fut = async {
            match &self.directions {
                Some(p) => p.alternatives(&request.origin, &request.destination).await,
                None => Err(ProviderError::NotConfigured("directions")),
            }
        };
        let weather_fut = async {
            match (&self.weather, request.location) {
                (Some(p), Some(at)) => p.current(at).await,
                (None, _) => Err(ProviderError::NotConfigured("weather")),
                (Some(_), None) => {
                    Err(ProviderError::Request("no location supplied for weather".into()))
                }
            }
        };

        let (routes, weather) = tokio::join!(routes_fut, weather_fut);

        let mut session = PlannerSession::new(self.engine.clone());
        if let Some(hour) = request.hour {
            session = session.with_hour(hour);
        }

        session.set_user(request.user.clone());
        session.apply_weather(weather);
        let ticket = session.apply_routes(routes);

        tracing::info!(
            "Planned {} -> {}: {} candidates, heat index {}",
            request.origin,
            request.destination,
            session.candidates().len(),
            session
                .heat_index()
                .map(|hi| format!("{:.1}{}", hi.value, hi.unit.symbol()))
                .unwrap_or_else(|| "unavailable".to_string())
        );

        if let (true, Some(ticket)) = (enrich, ticket) {
            let outcome: EnrichmentOutcome = self.engine.enrich(&ticket.prompt).await;
            session.complete_enrichment(ticket, outcome);
        }

        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heat_index::{TemperatureUnit, WeatherSample};
    use crate::providers::BoxFuture;
    use crate::recommendation::RecommendationStage;
    use crate::routes::RouteAlternative;
    use crate::session::SessionNotice;

    struct FixedRoutes;

    impl DirectionsProvider for FixedRoutes {
        fn alternatives<'a>(
            &'a self,
            _origin: &'a str,
            _destination: &'a str,
        ) -> BoxFuture<'a, Result<Vec<RouteAlternative>, ProviderError>> {
            Box::pin(async {
                Ok(vec![RouteAlternative {
                    distance_meters: 1200.0,
                    duration_seconds: 900.0,
                    steps: vec!["Follow the garden path".into()],
                    summary: None,
                }])
            })
        }
    }

    struct FixedWeather;

    impl WeatherProvider for FixedWeather {
        fn current(&self, _at: Coordinates) -> BoxFuture<'_, Result<WeatherSample, ProviderError>> {
            Box::pin(async { Ok(WeatherSample::new(88.0, TemperatureUnit::Fahrenheit, 55.0)) })
        }
    }

    fn request() -> PlanRequest {
        PlanRequest {
            origin: "Library".into(),
            destination: "Station".into(),
            location: Some(Coordinates { lat: 40.71, lon: -74.0 }),
            user: None,
            hour: Some(16),
        }
    }

    #[tokio::test]
    async fn test_plan_with_both_collaborators() {
        let planner = RoutePlanner::new(
            Some(Arc::new(FixedRoutes)),
            Some(Arc::new(FixedWeather)),
            RecommendationEngine::fallback_only(),
        );
        let session = planner.plan(&request(), true).await;

        assert_eq!(session.candidates().len(), 1);
        assert!(session.heat_index().is_some());
        assert!(session.notices().is_empty());
        // No completion provider: settled on fallback
        assert_eq!(session.recommendation().stage, RecommendationStage::Settled);
        assert!(!session.tips().is_empty());
    }

    #[tokio::test]
    async fn test_plan_without_collaborators() {
        let planner = RoutePlanner::default();
        let session = planner.plan(&request(), true).await;

        assert!(session.candidates().is_empty());
        assert!(session.notices().contains(&SessionNotice::NoRoutesFound));
        assert!(session.notices().contains(&SessionNotice::ConditionsUnavailable));
        assert!(!session.tips().is_empty());
    }
}
