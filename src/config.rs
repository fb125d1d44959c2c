//! Runtime configuration from environment variables.
//!
//! Provider credentials are optional: a missing key disables that provider
//! (routes/weather endpoints report the collaborator as unavailable and
//! recommendations stay on fallback tips).

use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub weather_api_key: Option<String>,
    pub maps_api_key: Option<String>,
    pub completion_api_url: String,
    pub completion_api_key: Option<String>,
    pub completion_model: String,
    pub enrichment_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            weather_api_key: None,
            maps_api_key: None,
            completion_api_url: DEFAULT_COMPLETION_URL.to_string(),
            completion_api_key: None,
            completion_model: "gpt-4".to_string(),
            enrichment_timeout: Duration::from_millis(8000),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            port: try_load("PORT", defaults.port)?,
            weather_api_key: secret("WEATHER_API_KEY"),
            maps_api_key: secret("MAPS_API_KEY"),
            completion_api_url: env::var("COMPLETION_API_URL")
                .unwrap_or(defaults.completion_api_url),
            completion_api_key: secret("COMPLETION_API_KEY"),
            completion_model: env::var("COMPLETION_MODEL").unwrap_or(defaults.completion_model),
            enrichment_timeout: Duration::from_millis(try_load("ENRICHMENT_TIMEOUT_MS", 8000u64)?),
            cache_ttl: Duration::from_secs(try_load("CACHE_TTL_SECS", 300u64)?),
        })
    }

    /// Log the effective configuration without exposing secrets
    pub fn log_summary(&self) {
        info!("Configuration:");
        info!("  PORT: {}", self.port);
        info!("  WEATHER_API_KEY: {}", presence(&self.weather_api_key));
        info!("  MAPS_API_KEY: {}", presence(&self.maps_api_key));
        info!("  COMPLETION_API_URL: {}", self.completion_api_url);
        info!("  COMPLETION_API_KEY: {}", presence(&self.completion_api_key));
        info!("  COMPLETION_MODEL: {}", self.completion_model);
        info!("  ENRICHMENT_TIMEOUT: {:?}", self.enrichment_timeout);
        info!("  CACHE_TTL: {:?}", self.cache_ttl);
    }
}

fn presence(value: &Option<String>) -> &'static str {
    if value.is_some() { "set" } else { "not set" }
}

fn try_load<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key} value {raw:?}: {e}")),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn secret(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => {
            warn!("{key} not set, provider disabled");
            None
        }
    }
}
