//! reqwest-backed collaborators
//!
//! - `GoogleDirectionsClient` - walking directions with alternatives
//! - `OpenWeatherClient` - current conditions in imperial units
//! - `ChatCompletionClient` - OpenAI-compatible chat completions
//!
//! Response bodies are decoded into typed structs; the decode step is kept
//! separate from the request so it can be tested against fixture JSON.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::{
    strip_html, BoxFuture, CompletionProvider, Coordinates, DirectionsProvider, WeatherProvider,
};
use crate::error::ProviderError;
use crate::heat_index::{TemperatureUnit, WeatherSample};
use crate::recommendation::CompletionPrompt;
use crate::routes::RouteAlternative;

const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

const COMPLETION_TEMPERATURE: f64 = 0.7;
const COMPLETION_MAX_TOKENS: u32 = 500;

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Request(e.to_string())
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status { status: status.as_u16(), message });
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode(e.to_string()))
}

// ============================================================================
// Directions
// ============================================================================

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    summary: Option<String>,
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: ValueField,
    duration: ValueField,
    #[serde(default)]
    steps: Vec<DirectionsStep>,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct DirectionsStep {
    #[serde(default)]
    html_instructions: String,
}

fn alternatives_from(body: DirectionsResponse) -> Result<Vec<RouteAlternative>, ProviderError> {
    match body.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Ok(Vec::new()),
        other => {
            return Err(ProviderError::Status {
                status: 200,
                message: body.error_message.unwrap_or_else(|| other.to_string()),
            })
        }
    }

    // Only the first leg is read; walking requests carry no waypoints
    let alternatives = body
        .routes
        .into_iter()
        .filter_map(|route| {
            let summary = route.summary.filter(|s| !s.is_empty());
            route.legs.into_iter().next().map(|leg| RouteAlternative {
                distance_meters: leg.distance.value,
                duration_seconds: leg.duration.value,
                steps: leg.steps.iter().map(|s| strip_html(&s.html_instructions)).collect(),
                summary,
            })
        })
        .collect();

    Ok(alternatives)
}

pub struct GoogleDirectionsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleDirectionsClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self { client, api_key: api_key.into(), base_url: DIRECTIONS_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl DirectionsProvider for GoogleDirectionsClient {
    fn alternatives<'a>(
        &'a self,
        origin: &'a str,
        destination: &'a str,
    ) -> BoxFuture<'a, Result<Vec<RouteAlternative>, ProviderError>> {
        Box::pin(async move {
            tracing::debug!("Requesting walking directions {} -> {}", origin, destination);
            let response = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("origin", origin),
                    ("destination", destination),
                    ("mode", "walking"),
                    ("alternatives", "true"),
                    ("key", self.api_key.as_str()),
                ])
                .send()
                .await?;
            alternatives_from(read_json(response).await?)
        })
    }
}

// ============================================================================
// Weather
// ============================================================================

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: WeatherMain,
    #[serde(default)]
    weather: Vec<WeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    temp: f64,
    humidity: f64,
    #[serde(default)]
    feels_like: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: String,
}

fn sample_from(body: WeatherResponse) -> WeatherSample {
    WeatherSample {
        temperature: body.main.temp,
        unit: TemperatureUnit::Fahrenheit,
        relative_humidity: body.main.humidity,
        feels_like: body.main.feels_like,
        description: body.weather.into_iter().next().map(|w| w.description),
    }
}

pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self { client, api_key: api_key.into(), base_url: WEATHER_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl WeatherProvider for OpenWeatherClient {
    fn current(&self, at: Coordinates) -> BoxFuture<'_, Result<WeatherSample, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("lat", at.lat.to_string()),
                    ("lon", at.lon.to_string()),
                    ("units", "imperial".to_string()),
                    ("appid", self.api_key.clone()),
                ])
                .send()
                .await?;
            Ok(sample_from(read_json(response).await?))
        })
    }
}

// ============================================================================
// Completions
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

fn content_from(body: ChatResponse) -> Result<String, ProviderError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(ProviderError::Empty)
}

pub struct ChatCompletionClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionClient {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self { client, url: url.into(), api_key: api_key.into(), model: model.into() }
    }

    fn headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl CompletionProvider for ChatCompletionClient {
    fn complete<'a>(
        &'a self,
        prompt: &'a CompletionPrompt,
    ) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let body = json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": prompt.system },
                    { "role": "user", "content": prompt.user }
                ],
                "temperature": COMPLETION_TEMPERATURE,
                "max_tokens": COMPLETION_MAX_TOKENS
            });

            let response = self
                .client
                .post(&self.url)
                .headers(self.headers()?)
                .json(&body)
                .send()
                .await?;
            content_from(read_json(response).await?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions_body() {
        let body: DirectionsResponse = serde_json::from_value(json!({
            "status": "OK",
            "routes": [
                {
                    "summary": "Main St",
                    "legs": [{
                        "distance": { "text": "1.2 km", "value": 1200 },
                        "duration": { "text": "15 mins", "value": 900 },
                        "steps": [
                            { "html_instructions": "Head <b>north</b> on <b>Main St</b>" },
                            { "html_instructions": "Turn left into <b>Riverside Park</b>" }
                        ]
                    }]
                },
                { "summary": "", "legs": [] }
            ]
        }))
        .unwrap();

        let alts = alternatives_from(body).unwrap();
        assert_eq!(alts.len(), 1);
        assert_eq!(alts[0].distance_meters, 1200.0);
        assert_eq!(alts[0].duration_seconds, 900.0);
        assert_eq!(alts[0].steps[0], "Head north on Main St");
        assert_eq!(alts[0].summary.as_deref(), Some("Main St"));
    }

    #[test]
    fn test_directions_zero_results_and_denied() {
        let empty: DirectionsResponse =
            serde_json::from_value(json!({ "status": "ZERO_RESULTS", "routes": [] })).unwrap();
        assert!(alternatives_from(empty).unwrap().is_empty());

        let denied: DirectionsResponse = serde_json::from_value(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }))
        .unwrap();
        assert!(matches!(alternatives_from(denied), Err(ProviderError::Status { .. })));
    }

    #[test]
    fn test_weather_body() {
        let body: WeatherResponse = serde_json::from_value(json!({
            "main": { "temp": 91.4, "feels_like": 99.0, "humidity": 55 },
            "weather": [{ "main": "Clear", "description": "clear sky" }]
        }))
        .unwrap();

        let sample = sample_from(body);
        assert_eq!(sample.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(sample.relative_humidity, 55.0);
        assert_eq!(sample.description.as_deref(), Some("clear sky"));
        assert!(sample.heat_index().is_ok());
    }

    #[test]
    fn test_completion_body() {
        let ok: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": "- Drink water" } }]
        }))
        .unwrap();
        assert_eq!(content_from(ok).unwrap(), "- Drink water");

        let blank: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(matches!(content_from(blank), Err(ProviderError::Empty)));
    }
}
