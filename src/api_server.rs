// Axum API server module
//
// Purpose: JSON surface over the heat index calculator, route ranking and the
// two-stage recommendation engine. Collaborators are injected as trait objects
// so tests can run the full router against mock providers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};

use moka::future::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{HeatIndexError, HistoryError};
use crate::heat_index::{HeatIndexResult, TemperatureUnit, WeatherSample};
use crate::history::{self, DailySample};
use crate::planner::{PlanRequest, RoutePlanner};
use crate::providers::http::{ChatCompletionClient, GoogleDirectionsClient, OpenWeatherClient};
use crate::providers::{CompletionProvider, DirectionsProvider, WeatherProvider};
use crate::recommendation::{
    safety_recommendations, ActivityLevel, RecommendationEngine, RecommendationInputs, UserProfile,
    WarningLevel,
};
use crate::routes::{
    exposure_score, safest_first, HeatExposureRisk, RouteAlternative, RouteCandidate,
    RouteRiskRanker,
};
use crate::shade::{current_local_hour, KeywordShadeEstimator, ShadeEstimator};

const HTTP_CLIENT_TIMEOUT: Duration = Duration::from_secs(15);

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub planner: RoutePlanner,
    pub estimator: Arc<dyn ShadeEstimator>,
    /// Safety sets and history summaries, keyed by request
    pub cache: Cache<String, serde_json::Value>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        tracing::info!("Initializing HTTP client...");
        let client = reqwest::Client::builder().timeout(HTTP_CLIENT_TIMEOUT).build()?;

        let directions = config.maps_api_key.as_ref().map(|key| {
            Arc::new(GoogleDirectionsClient::new(client.clone(), key.clone()))
                as Arc<dyn DirectionsProvider>
        });

        let weather = config.weather_api_key.as_ref().map(|key| {
            Arc::new(OpenWeatherClient::new(client.clone(), key.clone()))
                as Arc<dyn WeatherProvider>
        });

        let completion = config.completion_api_key.as_ref().map(|key| {
            Arc::new(ChatCompletionClient::new(
                client.clone(),
                config.completion_api_url.clone(),
                key.clone(),
                config.completion_model.clone(),
            )) as Arc<dyn CompletionProvider>
        });

        Ok(Self::with_providers(
            directions,
            weather,
            completion,
            config.enrichment_timeout,
            config.cache_ttl,
        ))
    }

    /// Build state from explicit collaborators (used by tests and embedders)
    pub fn with_providers(
        directions: Option<Arc<dyn DirectionsProvider>>,
        weather: Option<Arc<dyn WeatherProvider>>,
        completion: Option<Arc<dyn CompletionProvider>>,
        enrichment_timeout: Duration,
        cache_ttl: Duration,
    ) -> Self {
        let engine = match completion {
            Some(provider) => RecommendationEngine::new(provider, enrichment_timeout),
            None => {
                tracing::info!("No completion provider, recommendations use fallback tips only");
                RecommendationEngine::fallback_only()
            }
        };

        tracing::info!("Initializing Moka cache...");
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(cache_ttl)
            .build();

        Self {
            planner: RoutePlanner::new(directions, weather, engine),
            estimator: Arc::new(KeywordShadeEstimator::default()),
            cache,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Heat index endpoints
        .route("/api/heat-index", post(heat_index))
        .route("/api/heat-index/history", post(heat_index_history))
        .route("/api/safety", get(safety))

        // Route endpoints
        .route("/api/routes/rank", post(rank_routes))
        .route("/api/routes/plan", post(plan_routes))

        // Recommendation endpoint (fallback + optional enrichment)
        .route("/api/recommendations", post(recommendations))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct HistoryRequest {
    samples: Vec<DailySample>,
    #[serde(default)]
    unit: TemperatureUnit,
}

#[derive(Debug, Deserialize)]
struct SafetyQuery {
    heat_index_c: f64,
    #[serde(default)]
    activity: ActivityLevel,
}

#[derive(Debug, Deserialize)]
struct RankRequest {
    alternatives: Vec<RouteAlternative>,
    #[serde(default)]
    weather: Option<WeatherSample>,
    #[serde(default)]
    hour: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RecommendationRequest {
    #[serde(default)]
    heat_index: Option<HeatIndexResult>,
    #[serde(default)]
    route: Option<RouteCandidate>,
    #[serde(default)]
    weather: Option<WeatherSample>,
    #[serde(default)]
    user: Option<UserProfile>,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "enrichment": state.planner.engine().has_enrichment(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn heat_index(
    Json(sample): Json<WeatherSample>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = sample.heat_index()?;

    Ok(Json(serde_json::json!({
        "heat_index": result,
        "display_value": result.display_value(),
        "risk_label": result.risk_tier.display_name(),
        "heat_index_f": result.fahrenheit(),
        "heat_index_c": result.celsius(),
    })))
}

async fn heat_index_history(
    State(state): State<AppState>,
    Json(req): Json<HistoryRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request_json = serde_json::to_string(&(&req.samples, req.unit))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let cache_key = format!("history:{}", request_json);
    if let Some(cached) = state.cache.get(&cache_key).await {
        return Ok(Json(cached));
    }

    let samples = req.samples;
    let unit = req.unit;
    // rayon work off the async runtime
    let summary = tokio::task::spawn_blocking(move || history::summarize(&samples, unit))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    let value = serde_json::to_value(&summary).map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache.insert(cache_key, value.clone()).await;
    Ok(Json(value))
}

async fn safety(
    State(state): State<AppState>,
    Query(query): Query<SafetyQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !query.heat_index_c.is_finite() {
        return Err(AppError::BadRequest("heat_index_c must be a finite number".to_string()));
    }

    // The response depends only on the warning level, so key on that
    let level = WarningLevel::from_adjusted(query.heat_index_c * query.activity.multiplier());
    let cache_key = format!("safety:{:?}:{:?}", level, query.activity);
    if let Some(cached) = state.cache.get(&cache_key).await {
        return Ok(Json(cached));
    }

    let set = safety_recommendations(query.heat_index_c, query.activity);
    let value = serde_json::to_value(&set).map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache.insert(cache_key, value.clone()).await;
    Ok(Json(value))
}

async fn rank_routes(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let heat_index = req.weather.as_ref().map(WeatherSample::heat_index).transpose()?;
    let hour = req.hour.map(|h| h % 24).unwrap_or_else(current_local_hour);

    let candidates = RouteRiskRanker.rank_all(
        &req.alternatives,
        state.estimator.as_ref(),
        heat_index.as_ref(),
        hour,
    );
    let order = safest_first(&candidates);

    Ok(Json(serde_json::json!({
        "heat_index": heat_index,
        "hour": hour,
        "candidates": candidates,
        "safest_first": order,
    })))
}

async fn plan_routes(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if req.origin.trim().is_empty() || req.destination.trim().is_empty() {
        return Err(AppError::BadRequest("origin and destination are required".to_string()));
    }

    let session = state.planner.plan(&req, false).await;
    let notices: Vec<String> = session.notices().iter().map(|n| n.to_string()).collect();

    Ok(Json(serde_json::json!({
        "candidates": session.candidates(),
        "safest_first": safest_first(session.candidates()),
        "selected_index": session.selected_index(),
        "weather": session.weather(),
        "heat_index": session.heat_index(),
        "recommendation": session.recommendation(),
        "notices": notices,
    })))
}

async fn recommendations(
    State(state): State<AppState>,
    Json(req): Json<RecommendationRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    // A supplied heat index keeps its value but not its tier; otherwise derive
    // it from the weather sample
    let heat_index = match (req.heat_index, req.weather.as_ref()) {
        (Some(hi), _) => Some(
            HeatIndexResult::from_value(hi.value, hi.unit)
                .map_err(|e| AppError::BadRequest(format!("invalid heat_index: {}", e)))?,
        ),
        (None, Some(weather)) => Some(weather.heat_index()?),
        (None, None) => None,
    };
    let route = req
        .route
        .map(|route| validated_route(route, heat_index.as_ref()))
        .transpose()?;

    let inputs = RecommendationInputs {
        heat_index: heat_index.as_ref(),
        route: route.as_ref(),
        weather: req.weather.as_ref(),
        user: req.user.as_ref(),
    };

    let recommendation = state.planner.engine().recommend(&inputs).await;

    Ok(Json(serde_json::json!({
        "tips": recommendation.tips(),
        "enriched": recommendation.is_enriched(),
        "heat_index": heat_index,
        "recommendation": recommendation,
    })))
}

/// Check a client-supplied candidate and re-derive its score and risk
fn validated_route(
    mut route: RouteCandidate,
    heat_index: Option<&HeatIndexResult>,
) -> Result<RouteCandidate, AppError> {
    let non_negative = |v: f64| v.is_finite() && v >= 0.0;
    if !non_negative(route.distance_meters) {
        return Err(AppError::BadRequest(
            "route distance_meters must be a non-negative number".to_string(),
        ));
    }
    if !non_negative(route.duration_seconds) {
        return Err(AppError::BadRequest(
            "route duration_seconds must be a non-negative number".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&route.shade_coverage_percent) {
        return Err(AppError::BadRequest(
            "route shade_coverage_percent must be within 0-100".to_string(),
        ));
    }

    route.exposure_score =
        exposure_score(route.distance_km(), route.shade_coverage_percent, heat_index);
    route.heat_exposure_risk = HeatExposureRisk::from_score(route.exposure_score);
    Ok(route)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    InvalidReading(HeatIndexError),
    Internal(String),
}

impl From<HeatIndexError> for AppError {
    fn from(e: HeatIndexError) -> Self {
        AppError::InvalidReading(e)
    }
}

impl From<HistoryError> for AppError {
    fn from(e: HistoryError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidReading(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
