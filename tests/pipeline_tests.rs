// Pipeline Tests
//
// Purpose: End-to-end properties across heat index, shade, ranking and
// recommendations using only the public API
// Run with: cargo test --test pipeline_tests

use std::sync::Arc;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use heat_route_scorer::heat_index::{
    celsius_to_fahrenheit, fahrenheit_to_celsius, MAX_TEMPERATURE_F, MIN_TEMPERATURE_F,
};
use heat_route_scorer::providers::BoxFuture;
use heat_route_scorer::recommendation::{parse_recommendations, CompletionPrompt};
use heat_route_scorer::{
    compute, fallback_tips, safety_recommendations, ActivityLevel, CompletionProvider,
    HeatExposureRisk, KeywordShadeEstimator, PlannerSession, ProviderError, RecommendationEngine,
    RecommendationInputs, RecommendationStage, RiskTier, RouteAlternative, RouteRiskRanker,
    RouteType, ShadeEstimator, TemperatureUnit, WarningLevel, WeatherSample,
};

fn alt(distance_meters: f64, minutes: f64, steps: &[&str]) -> RouteAlternative {
    RouteAlternative {
        distance_meters,
        duration_seconds: minutes * 60.0,
        steps: steps.iter().map(|s| s.to_string()).collect(),
        summary: None,
    }
}

// =========================================================================
// Heat index
// =========================================================================

#[test]
fn test_risk_tier_monotonic_in_temperature() {
    for rh in [0.0, 20.0, 40.0, 60.0, 80.0, 100.0] {
        let mut previous = RiskTier::Low;
        let mut t = MIN_TEMPERATURE_F;
        while t <= MAX_TEMPERATURE_F {
            let tier = compute(t, rh, TemperatureUnit::Fahrenheit).unwrap().risk_tier;
            assert!(tier >= previous, "tier dropped at {t}°F / {rh}%");
            previous = tier;
            t += 0.5;
        }
    }
}

#[test]
fn test_units_agree() {
    for (t_c, rh) in [(18.0, 40.0), (28.0, 55.0), (33.0, 70.0), (40.0, 30.0)] {
        let c = compute(t_c, rh, TemperatureUnit::Celsius).unwrap();
        let f = compute(celsius_to_fahrenheit(t_c), rh, TemperatureUnit::Fahrenheit).unwrap();
        assert_abs_diff_eq!(c.fahrenheit(), f.value, epsilon = 1e-6);
        assert_eq!(c.risk_tier, f.risk_tier);
    }
    assert_abs_diff_eq!(fahrenheit_to_celsius(celsius_to_fahrenheit(31.7)), 31.7, epsilon = 0.1);
}

#[test]
fn test_invalid_readings_rejected() {
    assert!(compute(f64::INFINITY, 50.0, TemperatureUnit::Fahrenheit).is_err());
    assert!(compute(90.0, f64::NAN, TemperatureUnit::Fahrenheit).is_err());
    assert!(compute(90.0, 100.5, TemperatureUnit::Fahrenheit).is_err());
}

// =========================================================================
// Shade and ranking
// =========================================================================

#[test]
fn test_shade_always_within_bounds() {
    let estimator = KeywordShadeEstimator::default();
    let many_parks: Vec<String> = (0..20).map(|_| "Park garden trail".to_string()).collect();
    let many_highways: Vec<String> =
        (0..20).map(|_| "Highway onto major boulevard".to_string()).collect();

    for hour in 0..24 {
        for steps in [&many_parks[..], &many_highways[..], &[][..]] {
            let shade = estimator.estimate(steps, hour);
            assert!((5.0..=90.0).contains(&shade), "{shade} at hour {hour}");
            assert_eq!(shade, shade.round());
        }
    }
}

#[test]
fn test_ranking_is_per_route() {
    let estimator = KeywordShadeEstimator::default();
    let hot = compute(100.0, 50.0, TemperatureUnit::Fahrenheit).unwrap();
    let a = alt(2000.0, 25.0, &["Head east on Grand Avenue"]);
    let b = alt(800.0, 10.0, &["Walk through the park"]);

    let forward = RouteRiskRanker.rank_all(&[a.clone(), b.clone()], &estimator, Some(&hot), 12);
    let backward = RouteRiskRanker.rank_all(&[b, a], &estimator, Some(&hot), 12);

    assert_eq!(forward[0].heat_exposure_risk, backward[1].heat_exposure_risk);
    assert_eq!(forward[1].heat_exposure_risk, backward[0].heat_exposure_risk);
    assert_eq!(forward[0].shade_coverage_percent, backward[1].shade_coverage_percent);
}

#[test]
fn test_longer_exposure_never_ranks_safer() {
    let estimator = KeywordShadeEstimator::default();
    let hot = compute(92.0, 45.0, TemperatureUnit::Fahrenheit).unwrap();
    let mut previous = HeatExposureRisk::Low;

    for km in 1..=40 {
        let candidates = RouteRiskRanker.rank_all(
            &[alt(km as f64 * 100.0, km as f64, &["Continue on Main St"])],
            &estimator,
            Some(&hot),
            9,
        );
        let risk = candidates[0].heat_exposure_risk;
        assert!(risk >= previous);
        previous = risk;
    }
    assert_eq!(previous, HeatExposureRisk::VeryHigh);
}

// =========================================================================
// Recommendations
// =========================================================================

#[test]
fn test_fallback_never_empty() {
    for hi in [f64::NEG_INFINITY, 60.0, 80.0, 90.0, 105.0, 130.0] {
        for route_type in [RouteType::Shaded, RouteType::Direct] {
            for minutes in [0, 45, 46, 120] {
                assert!(fallback_tips(hi, route_type, minutes).len() >= 4);
            }
        }
    }
}

#[test]
fn test_safety_level_monotonic_in_activity() {
    let levels: Vec<WarningLevel> = [
        ActivityLevel::Resting,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Vigorous,
    ]
    .into_iter()
    .map(|a| safety_recommendations(30.0, a).warning_level)
    .collect();

    assert!(levels.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(levels[0], WarningLevel::LowModerate);
    assert_eq!(levels[3], WarningLevel::Extreme);
}

#[test]
fn test_reply_parsing() {
    assert_eq!(parse_recommendations("- a\n  • b  \nnot a bullet"), vec!["a", "b"]);
    assert_eq!(parse_recommendations("first\n\n second "), vec!["first", "second"]);
    assert!(parse_recommendations("  \n\n").is_empty());
}

struct SlowCompletion;

impl CompletionProvider for SlowCompletion {
    fn complete<'a>(
        &'a self,
        _prompt: &'a CompletionPrompt,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("- too late".to_string())
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_enrichment_keeps_fallback() {
    let engine = RecommendationEngine::new(Arc::new(SlowCompletion), Duration::from_millis(500));
    let weather = WeatherSample::new(95.0, TemperatureUnit::Fahrenheit, 60.0);
    let hi = weather.heat_index().unwrap();
    let estimator = KeywordShadeEstimator::default();
    let routes = [alt(3000.0, 50.0, &["Highway overpass"])];
    let candidates = RouteRiskRanker.rank_all(&routes, &estimator, Some(&hi), 13);

    let inputs = RecommendationInputs {
        heat_index: Some(&hi),
        route: candidates.first(),
        weather: Some(&weather),
        user: None,
    };
    let recommendation = engine.recommend(&inputs).await;

    assert!(!recommendation.is_enriched());
    assert_eq!(recommendation.stage, RecommendationStage::Settled);
    assert_eq!(recommendation.route_type, RouteType::Direct);
    assert!(recommendation
        .tips()
        .iter()
        .any(|t| t.contains("journeys over 45 minutes")));
}

#[test]
fn test_session_with_estimator_swap() {
    struct FullShade;
    impl ShadeEstimator for FullShade {
        fn estimate(&self, _steps: &[String], _hour: u32) -> f64 {
            90.0
        }
    }

    let mut session = PlannerSession::new(RecommendationEngine::fallback_only())
        .with_estimator(Arc::new(FullShade))
        .with_hour(12);
    session.apply_weather(Ok(WeatherSample::new(34.0, TemperatureUnit::Celsius, 50.0)));
    session.apply_routes(Ok(vec![alt(1500.0, 20.0, &["Highway"])]));

    let candidate = session.selected_candidate().unwrap();
    assert_eq!(candidate.shade_coverage_percent, 90.0);
    assert_eq!(session.recommendation().route_type, RouteType::Shaded);
    assert_eq!(session.recommendation().stage, RecommendationStage::Settled);
}
