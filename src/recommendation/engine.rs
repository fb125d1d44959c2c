//! Two-stage recommendation engine
//!
//! Stage 1 (fallback) runs synchronously and always yields tips.
//! Stage 2 (enrichment) asks the completion provider for personalised tips and
//! replaces the fallback only when the reply parses to a non-empty list.
//!
//! ```text
//! Idle → FallbackComputed → EnrichmentRequested → EnrichmentSucceeded ─┐
//!              │                                 └→ EnrichmentFailed ───┤
//!              └────────────────────────────────────────────────────────┴→ Settled
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::fallback::{fallback_tips, RouteType, DEFAULT_DURATION_MINUTES};
use super::parse::parse_recommendations;
use super::prompt::{CompletionPrompt, EnrichmentContext, UserProfile};
use crate::error::ProviderError;
use crate::heat_index::{HeatIndexResult, WeatherSample};
use crate::providers::CompletionProvider;
use crate::routes::RouteCandidate;

pub const DEFAULT_ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStage {
    Idle,
    FallbackComputed,
    EnrichmentRequested,
    EnrichmentSucceeded,
    EnrichmentFailed,
    Settled,
}

/// Result of one enrichment attempt
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    Succeeded(Vec<String>),
    /// Reason is for logs only; it is never shown in the tip list
    Failed(String),
}

impl From<Result<String, ProviderError>> for EnrichmentOutcome {
    fn from(result: Result<String, ProviderError>) -> Self {
        match result {
            Ok(text) => {
                let tips = parse_recommendations(&text);
                if tips.is_empty() {
                    EnrichmentOutcome::Failed(ProviderError::Empty.to_string())
                } else {
                    EnrichmentOutcome::Succeeded(tips)
                }
            }
            Err(e) => EnrichmentOutcome::Failed(e.to_string()),
        }
    }
}

/// Inputs for one recommendation cycle; anything may be missing
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationInputs<'a> {
    pub heat_index: Option<&'a HeatIndexResult>,
    pub route: Option<&'a RouteCandidate>,
    pub weather: Option<&'a WeatherSample>,
    pub user: Option<&'a UserProfile>,
}

impl<'a> RecommendationInputs<'a> {
    /// Enrichment preconditions: weather, a selected route and a heat index
    pub fn enrichment_context(&self) -> Option<EnrichmentContext<'a>> {
        Some(EnrichmentContext {
            weather: self.weather?,
            route: self.route?,
            heat_index: self.heat_index?,
            user: self.user,
        })
    }
}

/// Two-stage result: the fallback is always kept, enrichment may override it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub stage: RecommendationStage,
    pub route_type: RouteType,
    pub duration_minutes: u32,
    pub fallback: Vec<String>,
    pub enriched: Option<Vec<String>>,
}

impl Recommendation {
    /// Tips to display: enriched when available, fallback otherwise
    pub fn tips(&self) -> &[String] {
        self.enriched.as_deref().unwrap_or(&self.fallback)
    }

    pub fn is_enriched(&self) -> bool {
        self.enriched.is_some()
    }

    /// FallbackComputed → EnrichmentRequested
    pub fn begin_enrichment(&mut self) -> bool {
        if self.stage != RecommendationStage::FallbackComputed {
            tracing::debug!("Ignoring enrichment request in stage {:?}", self.stage);
            return false;
        }
        self.stage = RecommendationStage::EnrichmentRequested;
        true
    }

    /// EnrichmentRequested → EnrichmentSucceeded | EnrichmentFailed
    pub fn apply_enrichment(&mut self, outcome: EnrichmentOutcome) {
        if self.stage != RecommendationStage::EnrichmentRequested {
            tracing::debug!("Dropping enrichment outcome in stage {:?}", self.stage);
            return;
        }
        match outcome {
            EnrichmentOutcome::Succeeded(tips) => {
                tracing::debug!("Enrichment produced {} tips", tips.len());
                self.enriched = Some(tips);
                self.stage = RecommendationStage::EnrichmentSucceeded;
            }
            EnrichmentOutcome::Failed(reason) => {
                tracing::warn!("Enrichment failed, keeping fallback tips: {}", reason);
                self.stage = RecommendationStage::EnrichmentFailed;
            }
        }
    }

    /// Any non-idle stage → Settled
    pub fn settle(&mut self) {
        if self.stage != RecommendationStage::Idle {
            self.stage = RecommendationStage::Settled;
        }
    }
}

/// Recommendation engine with an optional completion provider
#[derive(Clone)]
pub struct RecommendationEngine {
    provider: Option<Arc<dyn CompletionProvider>>,
    timeout: Duration,
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("enrichment", &self.provider.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::fallback_only()
    }
}

impl RecommendationEngine {
    pub fn new(provider: Arc<dyn CompletionProvider>, timeout: Duration) -> Self {
        Self { provider: Some(provider), timeout }
    }

    /// Engine that never leaves the fallback stage
    pub fn fallback_only() -> Self {
        Self { provider: None, timeout: DEFAULT_ENRICHMENT_TIMEOUT }
    }

    pub fn has_enrichment(&self) -> bool {
        self.provider.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Stage 1. Without a selected route: `Direct`, 30 minutes.
    /// Without a heat index only base and route tips apply.
    pub fn fallback(&self, inputs: &RecommendationInputs<'_>) -> Recommendation {
        let (route_type, duration_minutes) = match inputs.route {
            Some(route) => {
                (RouteType::from_shade(route.shade_coverage_percent), route.duration_minutes())
            }
            None => (RouteType::Direct, DEFAULT_DURATION_MINUTES),
        };
        let heat_index_f = inputs.heat_index.map(|hi| hi.fahrenheit()).unwrap_or(f64::NEG_INFINITY);

        Recommendation {
            stage: RecommendationStage::FallbackComputed,
            route_type,
            duration_minutes,
            fallback: fallback_tips(heat_index_f, route_type, duration_minutes),
            enriched: None,
        }
    }

    /// Prompt for stage 2, or `None` when enrichment should be skipped
    pub fn enrichment_prompt(&self, inputs: &RecommendationInputs<'_>) -> Option<CompletionPrompt> {
        if self.provider.is_none() {
            return None;
        }
        inputs.enrichment_context().map(|ctx| CompletionPrompt::build(&ctx))
    }

    /// Stage 2: one bounded call to the completion provider
    pub async fn enrich(&self, prompt: &CompletionPrompt) -> EnrichmentOutcome {
        let Some(provider) = &self.provider else {
            let reason = ProviderError::NotConfigured("completion").to_string();
            return EnrichmentOutcome::Failed(reason);
        };

        match tokio::time::timeout(self.timeout, provider.complete(prompt)).await {
            Ok(result) => EnrichmentOutcome::from(result),
            Err(_) => EnrichmentOutcome::Failed(ProviderError::Timeout(self.timeout).to_string()),
        }
    }

    /// Full cycle: fallback, then enrichment when its preconditions hold
    pub async fn recommend(&self, inputs: &RecommendationInputs<'_>) -> Recommendation {
        let mut recommendation = self.fallback(inputs);

        if let Some(prompt) = self.enrichment_prompt(inputs) {
            recommendation.begin_enrichment();
            let outcome = self.enrich(&prompt).await;
            recommendation.apply_enrichment(outcome);
        } else {
            tracing::debug!("Enrichment preconditions not met, settling on fallback tips");
        }

        recommendation.settle();
        recommendation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heat_index::{compute, TemperatureUnit};
    use crate::providers::BoxFuture;
    use crate::routes::HeatExposureRisk;

    struct Scripted(Result<&'static str, &'static str>);

    impl CompletionProvider for Scripted {
        fn complete<'a>(
            &'a self,
            _prompt: &'a CompletionPrompt,
        ) -> BoxFuture<'a, Result<String, ProviderError>> {
            let reply =
                self.0.map(str::to_string).map_err(|e| ProviderError::Request(e.to_string()));
            Box::pin(async move { reply })
        }
    }

    struct Stalled;

    impl CompletionProvider for Stalled {
        fn complete<'a>(
            &'a self,
            _prompt: &'a CompletionPrompt,
        ) -> BoxFuture<'a, Result<String, ProviderError>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("- too late".to_string())
            })
        }
    }

    fn route(shade: f64, minutes: f64) -> RouteCandidate {
        RouteCandidate {
            index: 0,
            distance_meters: 3000.0,
            duration_seconds: minutes * 60.0,
            steps: vec![],
            summary: None,
            shade_coverage_percent: shade,
            exposure_score: 1.0,
            heat_exposure_risk: HeatExposureRisk::Moderate,
        }
    }

    #[test]
    fn test_fallback_defaults_without_route() {
        let engine = RecommendationEngine::fallback_only();
        let hi = compute(70.0, 50.0, TemperatureUnit::Fahrenheit).unwrap();
        let inputs = RecommendationInputs { heat_index: Some(&hi), ..Default::default() };
        let rec = engine.fallback(&inputs);

        assert_eq!(rec.stage, RecommendationStage::FallbackComputed);
        assert_eq!(rec.route_type, RouteType::Direct);
        assert_eq!(rec.duration_minutes, 30);
        assert_eq!(rec.tips().len(), 6);
    }

    #[test]
    fn test_fallback_without_heat_index_still_has_tips() {
        let engine = RecommendationEngine::fallback_only();
        let rec = engine.fallback(&RecommendationInputs::default());
        assert!(!rec.tips().is_empty());
    }

    #[tokio::test]
    async fn test_enrichment_replaces_fallback() {
        let engine = RecommendationEngine::new(
            Arc::new(Scripted(Ok("Tips:\n- Carry two litres of water\n- Walk before 9am"))),
            Duration::from_secs(1),
        );
        let weather = WeatherSample::new(95.0, TemperatureUnit::Fahrenheit, 60.0);
        let hi = weather.heat_index().unwrap();
        let route = route(60.0, 50.0);

        let rec = engine
            .recommend(&RecommendationInputs {
                heat_index: Some(&hi),
                route: Some(&route),
                weather: Some(&weather),
                user: None,
            })
            .await;

        assert_eq!(rec.stage, RecommendationStage::Settled);
        assert!(rec.is_enriched());
        assert_eq!(rec.tips(), ["Carry two litres of water", "Walk before 9am"]);
        assert_eq!(rec.route_type, RouteType::Shaded);
        assert!(rec.fallback.len() > 4);
    }

    #[tokio::test]
    async fn test_provider_error_keeps_fallback() {
        let engine = RecommendationEngine::new(
            Arc::new(Scripted(Err("connection refused"))),
            Duration::from_secs(1),
        );
        let weather = WeatherSample::new(95.0, TemperatureUnit::Fahrenheit, 60.0);
        let hi = weather.heat_index().unwrap();
        let route = route(20.0, 20.0);
        let inputs = RecommendationInputs {
            heat_index: Some(&hi),
            route: Some(&route),
            weather: Some(&weather),
            user: None,
        };

        let expected = engine.fallback(&inputs).fallback;
        let rec = engine.recommend(&inputs).await;

        assert!(!rec.is_enriched());
        assert_eq!(rec.tips(), expected.as_slice());
        assert!(!rec.tips().iter().any(|t| t.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_blank_reply_counts_as_failure() {
        let engine =
            RecommendationEngine::new(Arc::new(Scripted(Ok("\n   \n"))), Duration::from_secs(1));
        let weather = WeatherSample::new(33.0, TemperatureUnit::Celsius, 55.0);
        let hi = weather.heat_index().unwrap();
        let route = route(30.0, 25.0);

        let inputs = RecommendationInputs {
            heat_index: Some(&hi),
            route: Some(&route),
            weather: Some(&weather),
            user: None,
        };

        let mut rec = engine.fallback(&inputs);
        assert!(rec.begin_enrichment());
        let prompt = engine.enrichment_prompt(&inputs).unwrap();
        rec.apply_enrichment(engine.enrich(&prompt).await);

        assert_eq!(rec.stage, RecommendationStage::EnrichmentFailed);
        assert!(!rec.is_enriched());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_fallback() {
        let engine = RecommendationEngine::new(Arc::new(Stalled), Duration::from_millis(250));
        let weather = WeatherSample::new(100.0, TemperatureUnit::Fahrenheit, 40.0);
        let hi = weather.heat_index().unwrap();
        let route = route(10.0, 70.0);

        let rec = engine
            .recommend(&RecommendationInputs {
                heat_index: Some(&hi),
                route: Some(&route),
                weather: Some(&weather),
                user: None,
            })
            .await;

        assert_eq!(rec.stage, RecommendationStage::Settled);
        assert!(!rec.is_enriched());
        assert!(rec.tips().iter().any(|t| t.contains("45 minutes")));
    }

    #[tokio::test]
    async fn test_missing_weather_skips_enrichment() {
        let engine = RecommendationEngine::new(
            Arc::new(Scripted(Ok("- never used"))),
            Duration::from_secs(1),
        );
        let hi = compute(92.0, 50.0, TemperatureUnit::Fahrenheit).unwrap();
        let route = route(30.0, 20.0);
        let inputs = RecommendationInputs {
            heat_index: Some(&hi),
            route: Some(&route),
            weather: None,
            user: None,
        };

        assert!(engine.enrichment_prompt(&inputs).is_none());
        let rec = engine.recommend(&inputs).await;
        assert_eq!(rec.stage, RecommendationStage::Settled);
        assert!(!rec.is_enriched());
    }

    #[test]
    fn test_out_of_order_transitions_ignored() {
        let engine = RecommendationEngine::fallback_only();
        let mut rec = engine.fallback(&RecommendationInputs::default());

        rec.apply_enrichment(EnrichmentOutcome::Succeeded(vec!["x".into()]));
        assert_eq!(rec.stage, RecommendationStage::FallbackComputed);
        assert!(!rec.is_enriched());

        rec.settle();
        assert!(!rec.begin_enrichment());
        assert_eq!(rec.stage, RecommendationStage::Settled);
    }
}
