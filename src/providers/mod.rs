//! External collaborators
//!
//! Directions, weather and completion services are consumed through these
//! traits only. The futures are boxed so the traits stay object-safe and the
//! server can hold `Arc<dyn …>` handles (real HTTP clients or test doubles).
//!
//! - `http.rs` - reqwest-backed clients (feature `api`)
//! - `html.rs` - instruction text cleanup shared by the directions client

pub mod html;
#[cfg(feature = "api")]
pub mod http;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::heat_index::WeatherSample;
use crate::recommendation::CompletionPrompt;
use crate::routes::RouteAlternative;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

pub trait DirectionsProvider: Send + Sync {
    /// Walking alternatives between two free-text locations, in provider order
    fn alternatives<'a>(
        &'a self,
        origin: &'a str,
        destination: &'a str,
    ) -> BoxFuture<'a, Result<Vec<RouteAlternative>, ProviderError>>;
}

pub trait WeatherProvider: Send + Sync {
    fn current(&self, at: Coordinates) -> BoxFuture<'_, Result<WeatherSample, ProviderError>>;
}

pub trait CompletionProvider: Send + Sync {
    /// Free-text completion for the prompt
    fn complete<'a>(
        &'a self,
        prompt: &'a CompletionPrompt,
    ) -> BoxFuture<'a, Result<String, ProviderError>>;
}

pub use html::strip_html;
